//! Game state, phases and the host-facing event/snapshot surface
//!
//! A [`GameState`] owns the run: seed, RNG, balance, current phase and the
//! [`Stage`] in progress. Hosts drive it through [`super::tick`], read it
//! through [`GameState::snapshot`] and react to [`GameEvent`]s.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bonus::{Bonus, BonusKind};
use super::direction::Direction;
use super::grid::{Cell, Grid};
use super::pool::BotKind;
use super::stage::Stage;
use super::tank::{Player, Side, Tank, TankId};
use crate::error::GameError;
use crate::stages::StageSource;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Stage banner before play starts
    StageTitle,
    Playing,
    Paused,
    /// Pool exhausted and field clear; play continues until the next stage loads
    StageCleared,
    /// Run ended
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    HeadquartersDestroyed,
    OutOfLives,
}

/// Things that happened during a tick, for sound, effects and logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StageStarted { stage: u32 },
    StageCleared { stage: u32 },
    PauseToggled { paused: bool },
    BotSpawned { id: u32, kind: BotKind, carries_bonus: bool },
    ShotFired { tank: TankId },
    BulletExploded { pos: Vec2 },
    BulletsCollided { pos: Vec2 },
    TileDestroyed { cell: Cell },
    BotHit { id: u32, hp_left: u8 },
    BotDestroyed { id: u32, kind: BotKind },
    PlayerDestroyed { lives_left: u8 },
    BonusAppeared { kind: BonusKind, pos: Vec2 },
    BonusCollected { kind: BonusKind },
    HeadquartersDestroyed,
    GameOver { reason: GameOverReason },
}

impl GameEvent {
    /// Variant name, for tallies and log lines
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::StageStarted { .. } => "StageStarted",
            GameEvent::StageCleared { .. } => "StageCleared",
            GameEvent::PauseToggled { .. } => "PauseToggled",
            GameEvent::BotSpawned { .. } => "BotSpawned",
            GameEvent::ShotFired { .. } => "ShotFired",
            GameEvent::BulletExploded { .. } => "BulletExploded",
            GameEvent::BulletsCollided { .. } => "BulletsCollided",
            GameEvent::TileDestroyed { .. } => "TileDestroyed",
            GameEvent::BotHit { .. } => "BotHit",
            GameEvent::BotDestroyed { .. } => "BotDestroyed",
            GameEvent::PlayerDestroyed { .. } => "PlayerDestroyed",
            GameEvent::BonusAppeared { .. } => "BonusAppeared",
            GameEvent::BonusCollected { .. } => "BonusCollected",
            GameEvent::HeadquartersDestroyed => "HeadquartersDestroyed",
            GameEvent::GameOver { .. } => "GameOver",
        }
    }
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Seconds spent in the current timed phase
    pub phase_elapsed: f32,
    pub stage: Stage,
    /// Why the run ended, once it has
    pub game_over: Option<GameOverReason>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Fire key state on the previous tick
    pub fire_held: bool,
}

/// Load stage `number` from `stages` and build its terrain
pub fn load_grid<S: StageSource + ?Sized>(stages: &S, number: u32) -> Result<Grid, GameError> {
    let rows = stages.load_stage_definition(number)?;
    Ok(Grid::from_symbols(&rows)?)
}

impl GameState {
    /// Start a run at stage 1
    pub fn new<S: StageSource + ?Sized>(seed: u64, tuning: Tuning, stages: &S) -> Result<Self, GameError> {
        tuning.validate()?;
        let grid = load_grid(stages, 1)?;
        Ok(Self::with_grid(seed, tuning, 1, grid))
    }

    /// Start a run on already-built terrain
    pub fn with_grid(seed: u64, tuning: Tuning, number: u32, grid: Grid) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let player = Player::new(&tuning);
        let mut stage = Stage::new(number, grid, player, &mut rng);
        log::info!("Stage {number} loaded, {} bots in pool", stage.pool.len());
        stage.events.push(GameEvent::StageStarted { stage: number });
        Self {
            seed,
            rng,
            tuning,
            phase: GamePhase::StageTitle,
            phase_elapsed: 0.0,
            stage,
            game_over: None,
            time_ticks: 0,
            fire_held: false,
        }
    }

    /// Move on to the next stage, carrying lives and upgrade level
    pub fn advance_stage<S: StageSource + ?Sized>(&mut self, stages: &S) -> Result<(), GameError> {
        let number = self.stage.number + 1;
        let grid = load_grid(stages, number)?;
        let player = Player::with_progress(self.stage.player.lives, self.stage.player.level, &self.tuning);
        let mut stage = Stage::new(number, grid, player, &mut self.rng);
        // Events not yet drained survive the switch
        stage.events = std::mem::take(&mut self.stage.events);
        stage.events.push(GameEvent::StageStarted { stage: number });
        log::info!("Stage {number} loaded, {} bots in pool", stage.pool.len());
        self.stage = stage;
        self.phase = GamePhase::StageTitle;
        self.phase_elapsed = 0.0;
        Ok(())
    }

    /// Events since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.stage.events)
    }

    /// Terrain changed since the last call
    pub fn take_grid_changed(&mut self) -> bool {
        self.stage.grid.take_changed()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let stage = &self.stage;
        let frozen = stage.effects.is_time_stopped();
        let player = &stage.player;
        let mut tanks = vec![TankView {
            id: TankId::Player,
            side: Side::Human,
            pos: player.pos,
            direction: player.direction,
            bot_kind: None,
            carries_bonus: false,
            immune: player.is_immune(),
            spawning: player.is_spawning(),
            frozen: false,
        }];
        tanks.extend(stage.bots.iter().map(|bot| TankView {
            id: bot.id(),
            side: Side::Opponent,
            pos: bot.pos,
            direction: bot.direction,
            bot_kind: Some(bot.kind),
            carries_bonus: bot.carries_bonus,
            immune: false,
            spawning: false,
            frozen,
        }));
        Snapshot {
            phase: self.phase,
            stage: stage.number,
            lives: player.lives,
            level: player.level,
            pool_remaining: stage.pool.remaining(),
            bots_destroyed: stage.destroyed.len(),
            tanks,
            bullets: stage
                .bullets
                .iter()
                .map(|b| BulletView {
                    id: b.id,
                    pos: b.pos,
                    direction: b.direction(),
                    side: b.side,
                })
                .collect(),
            bonus: stage.bonus,
            time_stopped: frozen,
            hq_armored: stage.grid.is_hq_armored(),
            game_over: self.game_over,
            grid: &stage.grid,
        }
    }
}

/// Read-only view of one tank for rendering
#[derive(Debug, Clone, Serialize)]
pub struct TankView {
    pub id: TankId,
    pub side: Side,
    pub pos: Vec2,
    pub direction: Direction,
    pub bot_kind: Option<BotKind>,
    pub carries_bonus: bool,
    pub immune: bool,
    pub spawning: bool,
    pub frozen: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletView {
    pub id: u32,
    pub pos: Vec2,
    pub direction: Direction,
    pub side: Side,
}

/// Everything a host needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub stage: u32,
    pub lives: u8,
    pub level: u8,
    pub pool_remaining: usize,
    pub bots_destroyed: usize,
    /// Player first, then bots in spawn order
    pub tanks: Vec<TankView>,
    pub bullets: Vec<BulletView>,
    pub bonus: Option<Bonus>,
    pub time_stopped: bool,
    pub hq_armored: bool,
    pub game_over: Option<GameOverReason>,
    pub grid: &'a Grid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::tests::arena_rows;
    use crate::stages::MemoryStages;

    fn stages() -> MemoryStages {
        let mut stages = MemoryStages::new();
        stages.insert(1, arena_rows());
        stages.insert(2, arena_rows());
        stages
    }

    #[test]
    fn test_new_starts_with_title() {
        let mut state = GameState::new(42, Tuning::default(), &stages()).unwrap();
        assert_eq!(state.phase, GamePhase::StageTitle);
        assert_eq!(state.stage.number, 1);
        assert_eq!(state.stage.player.lives, 2);
        assert!(state.take_grid_changed());
        assert!(!state.take_grid_changed());
        assert_eq!(state.drain_events(), vec![GameEvent::StageStarted { stage: 1 }]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_missing_stage_is_an_error() {
        let empty = MemoryStages::new();
        assert!(matches!(
            GameState::new(1, Tuning::default(), &empty),
            Err(GameError::Stage(crate::error::StageError::NotFound(1)))
        ));
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let tuning = Tuning {
            max_bots: 0,
            ..Tuning::default()
        };
        assert!(matches!(
            GameState::new(1, tuning, &stages()),
            Err(GameError::Tuning(_))
        ));
    }

    #[test]
    fn test_advance_stage_carries_progress() {
        let mut state = GameState::new(42, Tuning::default(), &stages()).unwrap();
        state.stage.player.lives = 5;
        state.stage.player.upgrade();
        state.stage.player.upgrade();
        state.phase = GamePhase::StageCleared;
        state.advance_stage(&stages()).unwrap();
        assert_eq!(state.stage.number, 2);
        assert_eq!(state.phase, GamePhase::StageTitle);
        assert_eq!(state.stage.player.lives, 5);
        assert_eq!(state.stage.player.level, 2);
        assert!(state.stage.player.is_spawning());
        assert!(state.stage.bots.is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(7, Tuning::default(), &stages()).unwrap();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.tanks.len(), 1);
        assert_eq!(snapshot.tanks[0].id, TankId::Player);
        assert!(snapshot.tanks[0].spawning);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\":\"StageTitle\""));
    }
}
