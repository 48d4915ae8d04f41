//! Four-way movement directions

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Direction of travel, in clockwise order starting from north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position in clockwise order (North = 0)
    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Unit vector for this direction scaled by `speed` (y points up)
    pub fn velocity(self, speed: f32) -> Vec2 {
        let unit = match self {
            Direction::North => Vec2::new(0.0, 1.0),
            Direction::East => Vec2::new(1.0, 0.0),
            Direction::South => Vec2::new(0.0, -1.0),
            Direction::West => Vec2::new(-1.0, 0.0),
        };
        unit * speed
    }

    /// Sprite rotation for this direction (sprites are authored facing north)
    pub fn angle(self) -> f32 {
        match self {
            Direction::North => 0.0,
            Direction::East => 3.0 * PI / 2.0,
            Direction::South => PI,
            Direction::West => PI / 2.0,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.ordinal() % 2 == 1
    }

    pub fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }

    pub fn is_perpendicular(self, other: Direction) -> bool {
        (self.ordinal() + other.ordinal()) % 2 == 1
    }

    /// The two directions perpendicular to this one
    pub fn perpendiculars(self) -> [Direction; 2] {
        if self.is_horizontal() {
            [Direction::North, Direction::South]
        } else {
            [Direction::West, Direction::East]
        }
    }

    /// Uniformly random direction other than `self`
    pub fn random_other<R: Rng + ?Sized>(self, rng: &mut R) -> Direction {
        // Pick among the three others by skipping over our own slot
        let pick: usize = rng.random_range(0..3);
        let own = self.ordinal() as usize;
        Direction::ALL[if pick >= own { pick + 1 } else { pick }]
    }
}
