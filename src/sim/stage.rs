//! One stage in progress: terrain, tanks, bullets and the spawn schedule
//!
//! [`Stage::step`] runs a single Playing tick. Phase handling lives in
//! [`super::tick`]; this module only knows how a stage unfolds.

use glam::Vec2;
use rand::{Rng, RngCore};

use super::bonus::{ActiveEffects, Bonus, BonusKind};
use super::bullet::Bullet;
use super::grid::Grid;
use super::movement::{MovePlan, resolve_movement};
use super::pool::{BotKind, SpawnPool};
use super::state::{GameEvent, GameOverReason};
use super::tank::{BOT_SPAWN_Y, Bot, MoveResult, Orders, Player, Tank, TankId, tank_rect};
use super::tick::TickInput;
use crate::consts::CELL_SIZE;
use crate::tuning::Tuning;

/// Columns a bot may spawn in (tank centre sits on the column's left edge)
const BOT_SPAWN_COLUMNS: std::ops::Range<u32> = 3..27;

#[derive(Debug, Clone)]
pub struct Stage {
    pub number: u32,
    pub grid: Grid,
    pub player: Player,
    /// Live bots in spawn order
    pub bots: Vec<Bot>,
    pub bullets: Vec<Bullet>,
    pub pool: SpawnPool,
    /// At most one pickup lies in the arena
    pub bonus: Option<Bonus>,
    pub effects: ActiveEffects,
    /// Archetypes destroyed so far, in order
    pub destroyed: Vec<BotKind>,
    pub events: Vec<GameEvent>,
    spawn_timer: f32,
    next_id: u32,
    outcome: Option<GameOverReason>,
}

impl Stage {
    pub fn new<R: Rng + ?Sized>(number: u32, grid: Grid, player: Player, rng: &mut R) -> Self {
        let pool = SpawnPool::build(number, rng);
        Self::with_pool(number, grid, player, pool)
    }

    /// Stage with a fixed spawn pool
    pub fn with_pool(number: u32, grid: Grid, player: Player, pool: SpawnPool) -> Self {
        Self {
            number,
            grid,
            player,
            bots: Vec::new(),
            bullets: Vec::new(),
            pool,
            bonus: None,
            effects: ActiveEffects::default(),
            destroyed: Vec::new(),
            events: Vec::new(),
            spawn_timer: 0.0,
            next_id: 1,
            outcome: None,
        }
    }

    /// Set once the headquarters falls or the last life is lost
    pub fn outcome(&self) -> Option<GameOverReason> {
        self.outcome
    }

    /// Pool used up and the field swept clean
    pub fn is_cleared(&self) -> bool {
        self.pool.is_exhausted() && self.bots.is_empty()
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Advance one Playing tick
    pub fn step(&mut self, input: &TickInput, rng: &mut dyn RngCore, tuning: &Tuning, dt: f32) {
        self.player.advance_timers(dt);
        for bot in &mut self.bots {
            bot.advance_timers(dt);
        }

        self.spawn_bots(rng, tuning, dt);
        self.move_tanks(input, rng, tuning, dt);
        self.effects.advance(dt, &mut self.grid, tuning);
        self.collect_bonus(tuning);
        self.resolve_bullets(rng, tuning, dt);
        if self.outcome.is_some() {
            return;
        }
        self.fire_weapons(input, rng, tuning, dt);
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    fn spawn_bots(&mut self, rng: &mut dyn RngCore, tuning: &Tuning, dt: f32) {
        // The very first bot of a stage appears without waiting
        let due = self.spawn_timer > tuning.bot_spawn_interval
            || (self.destroyed.is_empty() && self.bots.is_empty());
        self.spawn_timer += dt;
        if !due || self.bots.len() >= tuning.max_bots || self.pool.is_exhausted() {
            return;
        }
        let Some(pos) = self.find_spawn_point(rng, tuning) else {
            log::debug!("No free spawn column this tick");
            return;
        };
        let Some(ticket) = self.pool.next() else {
            return;
        };
        let id = self.next_entity_id();
        if ticket.carries_bonus {
            // A fresh carrier takes the pickup off the field
            self.bonus = None;
        }
        log::debug!("Spawned bot {id} ({:?}) at {pos}", ticket.kind);
        self.bots.push(Bot::new(id, ticket, pos));
        self.events.push(GameEvent::BotSpawned {
            id,
            kind: ticket.kind,
            carries_bonus: ticket.carries_bonus,
        });
        self.spawn_timer = 0.0;
    }

    fn find_spawn_point(&self, rng: &mut dyn RngCore, tuning: &Tuning) -> Option<Vec2> {
        (0..tuning.spawn_attempts).find_map(|_| {
            let column = rng.random_range(BOT_SPAWN_COLUMNS);
            let pos = Vec2::new(column as f32 * CELL_SIZE, BOT_SPAWN_Y);
            let rect = tank_rect(pos);
            let occupied = self.player.rect().intersects(&rect)
                || self.bots.iter().any(|bot| bot.rect().intersects(&rect));
            (!occupied).then_some(pos)
        })
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    fn move_tanks(&mut self, input: &TickInput, rng: &mut dyn RngCore, tuning: &Tuning, dt: f32) {
        let frozen = self.effects.is_time_stopped();
        let mut orders = Orders { input, rng, tuning };

        let mut plans = Vec::with_capacity(self.bots.len() + 1);
        let result = self.player.compute_candidate_move(&mut orders, dt);
        plans.push(MovePlan::new(TankId::Player, self.player.pos, result));
        for bot in &mut self.bots {
            let result = if frozen {
                MoveResult::stay(bot.pos, bot.direction)
            } else {
                bot.compute_candidate_move(&mut orders, dt)
            };
            plans.push(MovePlan::new(bot.id(), bot.pos, result));
        }

        resolve_movement(&self.grid, &mut plans);

        self.player.commit_move(&plans[0].result, dt);
        if !frozen {
            for (bot, plan) in self.bots.iter_mut().zip(&plans[1..]) {
                bot.commit_move(&plan.result, dt);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Bonuses
    // -----------------------------------------------------------------------

    fn collect_bonus(&mut self, tuning: &Tuning) {
        let Some(bonus) = self.bonus else {
            return;
        };
        if !bonus.rect().intersects(&self.player.rect()) {
            return;
        }
        self.bonus = None;
        log::info!("Collected {:?} bonus", bonus.kind);
        self.events.push(GameEvent::BonusCollected { kind: bonus.kind });
        self.apply_bonus(bonus.kind, tuning);
    }

    pub fn apply_bonus(&mut self, kind: BonusKind, tuning: &Tuning) {
        match kind {
            BonusKind::Immunity => self.player.make_immune(tuning.immunity_duration),
            BonusKind::TimeStop => self.effects.start_time_stop(tuning),
            BonusKind::HqArmor => self.effects.start_hq_armor(&mut self.grid),
            BonusKind::Upgrade => self.player.upgrade(),
            BonusKind::Annihilation => {
                for bot in std::mem::take(&mut self.bots) {
                    self.record_bot_destroyed(&bot);
                }
                self.spawn_timer = 0.0;
            }
            BonusKind::ExtraLife => {
                self.player.lives = (self.player.lives + 1).min(tuning.max_lives);
            }
        }
    }

    /// Drop a random pickup where a carrier died, replacing any on the field
    pub(super) fn release_bonus<R: Rng + ?Sized>(&mut self, pos: Vec2, rng: &mut R) {
        let bonus = Bonus {
            kind: BonusKind::random(rng),
            pos,
        };
        self.events.push(GameEvent::BonusAppeared {
            kind: bonus.kind,
            pos,
        });
        self.bonus = Some(bonus);
    }

    pub(super) fn record_bot_destroyed(&mut self, bot: &Bot) {
        self.destroyed.push(bot.kind);
        self.events.push(GameEvent::BotDestroyed {
            id: bot.id,
            kind: bot.kind,
        });
    }

    /// The player took a hit without immunity
    pub(super) fn kill_player(&mut self, tuning: &Tuning) {
        let Some(lives_left) = self.player.lives.checked_sub(1) else {
            self.events.push(GameEvent::PlayerDestroyed { lives_left: 0 });
            self.outcome = Some(GameOverReason::OutOfLives);
            return;
        };
        log::info!("Player destroyed, {lives_left} lives left");
        self.player.lives = lives_left;
        self.player.reset_level();
        self.player.respawn(tuning);
        self.events.push(GameEvent::PlayerDestroyed { lives_left });
    }

    pub(super) fn lose_headquarters(&mut self) {
        self.grid.destroy_headquarters();
        self.events.push(GameEvent::HeadquartersDestroyed);
        self.outcome = Some(GameOverReason::HeadquartersDestroyed);
    }

    // -----------------------------------------------------------------------
    // Shooting
    // -----------------------------------------------------------------------

    fn fire_weapons(&mut self, input: &TickInput, rng: &mut dyn RngCore, tuning: &Tuning, dt: f32) {
        let frozen = self.effects.is_time_stopped();
        let mut orders = Orders { input, rng, tuning };
        let mut fired = Vec::new();

        if let Some(bullet) = self.player.attempt_shoot(&mut orders, self.next_id, dt) {
            self.next_id += 1;
            fired.push(bullet);
        }
        if !frozen {
            for bot in &mut self.bots {
                if let Some(bullet) = bot.attempt_shoot(&mut orders, self.next_id, dt) {
                    self.next_id += 1;
                    fired.push(bullet);
                }
            }
        }

        for bullet in fired {
            self.events.push(GameEvent::ShotFired { tank: bullet.owner });
            self.bullets.push(bullet);
        }
    }

    /// Drop spent bullets and hand their slots back
    pub(super) fn purge_bullets(&mut self) {
        let (spent, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.bullets)
            .into_iter()
            .partition(|b| b.destroyed);
        self.bullets = live;
        for bullet in spent {
            match bullet.owner {
                TankId::Player => self.player.release_bullet(bullet.id),
                TankId::Bot(id) => {
                    if let Some(bot) = self.bots.iter_mut().find(|b| b.id == id) {
                        bot.release_bullet(bullet.id);
                    }
                }
            }
        }
    }
}
