//! Bonus pickups and the timed effects they leave behind

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, world_rect};
use super::grid::Grid;
use crate::consts::BONUS_SIZE;
use crate::tuning::Tuning;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Player shrugs off hits for a while
    Immunity,
    /// Bots freeze in place
    TimeStop,
    /// Steel ring around the headquarters
    HqArmor,
    /// Permanent upgrade level
    Upgrade,
    /// Every bot on the field explodes
    Annihilation,
    ExtraLife,
}

impl BonusKind {
    pub const ALL: [BonusKind; 6] = [
        BonusKind::Immunity,
        BonusKind::TimeStop,
        BonusKind::HqArmor,
        BonusKind::Upgrade,
        BonusKind::Annihilation,
        BonusKind::ExtraLife,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A pickup lying in the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    pub kind: BonusKind,
    pub pos: Vec2,
}

impl Bonus {
    pub fn rect(&self) -> Rect {
        world_rect(self.pos, BONUS_SIZE, BONUS_SIZE)
    }
}

/// Timed bonus effects layered on top of play
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub time_stop_left: f32,
    /// Seconds since the headquarters armor went up
    pub hq_armor_elapsed: Option<f32>,
}

impl ActiveEffects {
    pub fn is_time_stopped(&self) -> bool {
        self.time_stop_left > 0.0
    }

    pub fn start_time_stop(&mut self, tuning: &Tuning) {
        self.time_stop_left = tuning.time_stop_duration;
    }

    /// Raise (or refresh) the steel ring
    pub fn start_hq_armor(&mut self, grid: &mut Grid) {
        grid.armor_headquarters();
        self.hq_armor_elapsed = Some(0.0);
    }

    pub fn advance(&mut self, dt: f32, grid: &mut Grid, tuning: &Tuning) {
        self.time_stop_left = (self.time_stop_left - dt).max(0.0);

        let Some(elapsed) = self.hq_armor_elapsed.as_mut() else {
            return;
        };
        *elapsed += dt;
        let elapsed = *elapsed;

        if elapsed >= tuning.hq_armor_duration {
            grid.disarm_headquarters();
            self.hq_armor_elapsed = None;
            log::debug!("Headquarters armor expired");
            return;
        }
        if elapsed >= tuning.hq_armor_blink_start {
            // Even periods show the old walls, odd periods the steel
            let period = ((elapsed - tuning.hq_armor_blink_start) / tuning.hq_armor_blink_period) as u32;
            if period % 2 == 0 {
                grid.disarm_headquarters();
            } else if !grid.is_hq_armored() {
                grid.armor_headquarters();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::tests::arena;
    use crate::sim::grid::{Cell, HQ_ARMOR_CELLS};
    use crate::sim::tile::TileKind;

    fn ring_kind(grid: &Grid) -> TileKind {
        grid.tile(HQ_ARMOR_CELLS[0]).kind
    }

    #[test]
    fn test_time_stop_runs_out() {
        let tuning = Tuning::default();
        let mut grid = arena();
        let mut effects = ActiveEffects::default();
        effects.start_time_stop(&tuning);
        effects.advance(tuning.time_stop_duration - 0.5, &mut grid, &tuning);
        assert!(effects.is_time_stopped());
        effects.advance(1.0, &mut grid, &tuning);
        assert!(!effects.is_time_stopped());
    }

    #[test]
    fn test_hq_armor_blinks_then_reverts() {
        let tuning = Tuning::default();
        let mut grid = arena();
        let mut effects = ActiveEffects::default();
        effects.start_hq_armor(&mut grid);
        assert_eq!(ring_kind(&grid), TileKind::Steel);

        effects.advance(16.9, &mut grid, &tuning);
        assert_eq!(ring_kind(&grid), TileKind::Steel);

        // First blink period: walls back to brick
        effects.advance(0.2, &mut grid, &tuning);
        assert_eq!(ring_kind(&grid), TileKind::Brick);

        // Second period: steel again
        effects.advance(0.2, &mut grid, &tuning);
        assert_eq!(ring_kind(&grid), TileKind::Steel);

        effects.advance(3.0, &mut grid, &tuning);
        assert_eq!(ring_kind(&grid), TileKind::Brick);
        assert!(effects.hq_armor_elapsed.is_none());
        assert!(!grid.is_hq_armored());
    }

    #[test]
    fn test_armor_repairs_damaged_ring() {
        let tuning = Tuning::default();
        let mut grid = arena();
        let cell = Cell::new(25, 14);
        grid.apply_quadrant_damage(cell, None, crate::sim::Direction::North);
        let mut effects = ActiveEffects::default();
        effects.start_hq_armor(&mut grid);
        effects.advance(tuning.hq_armor_duration, &mut grid, &tuning);
        assert_eq!(grid.tile(cell).kind, TileKind::Brick);
        assert_eq!(grid.tile(cell).quadrants, crate::sim::tile::Quadrants::FULL);
    }
}
