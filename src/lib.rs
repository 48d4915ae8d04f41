//! Battle City - simulation core of a tile-based tank battle arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, tanks, bullets, spawning, phases)
//! - `stages`: Stage definition sources (in-memory and on-disk)
//! - `tuning`: Data-driven game balance
//! - `error`: Error types for stage loading and configuration

pub mod error;
pub mod sim;
pub mod stages;
pub mod tuning;

pub use error::{GameError, StageError, TuningError};
pub use stages::{DirStages, MemoryStages, StageSource, parse_stage_text};
pub use tuning::Tuning;

/// World geometry constants
pub mod consts {
    /// Fixed step used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Sprite-to-world scale factor
    pub const SCALE: f32 = 4.0;
    /// Block edge in sprite pixels
    pub const BLOCK_SIZE: f32 = 8.0;
    /// Block edge in world units (one grid cell)
    pub const CELL_SIZE: f32 = BLOCK_SIZE * SCALE;

    /// Arena dimensions in cells
    pub const GRID_ROWS: usize = 30;
    pub const GRID_COLUMNS: usize = 30;

    /// Tank edge in sprite pixels (2x2 cells once scaled)
    pub const TANK_SIZE: f32 = 16.0;
    /// Bullet sprite size, authored pointing north
    pub const BULLET_WIDTH: f32 = 3.0;
    pub const BULLET_HEIGHT: f32 = 4.0;
    /// Bonus pickup edge in sprite pixels
    pub const BONUS_SIZE: f32 = 16.0;

    /// Highest player upgrade level
    pub const MAX_LEVEL: u8 = 3;
}
