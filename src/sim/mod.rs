//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (player first, then bots in spawn order, bullets in firing order)
//! - No rendering or platform dependencies

pub mod bonus;
pub mod bullet;
mod combat;
pub mod direction;
pub mod geometry;
pub mod grid;
pub mod movement;
pub mod pool;
pub mod stage;
pub mod state;
pub mod tank;
pub mod tick;
pub mod tile;

pub use bonus::{ActiveEffects, Bonus, BonusKind};
pub use bullet::Bullet;
pub use direction::Direction;
pub use geometry::Rect;
pub use grid::{Cell, Grid, HQ_ARMOR_CELLS, HQ_CELLS};
pub use movement::{MovePlan, resolve_movement};
pub use pool::{BotKind, SpawnPool, SpawnTicket};
pub use stage::Stage;
pub use state::{BulletView, GameEvent, GameOverReason, GamePhase, GameState, Snapshot, TankView, load_grid};
pub use tank::{Bot, MoveResult, Player, Side, Tank, TankId};
pub use tick::{TickInput, tick};
pub use tile::{Quadrants, Tile, TileKind};
