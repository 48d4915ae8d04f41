//! Axis-aligned rectangles and grid snapping
//!
//! Every collision test in the arena is a plain rectangle overlap. Rectangles
//! that merely touch along an edge do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CELL_SIZE, SCALE};

/// An axis-aligned rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// True if the rectangles share a region of positive area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Rectangle centred on `center` with sprite-pixel `width`/`height` scaled to world units
#[inline]
pub fn axis_rect(center: Vec2, width: f32, height: f32, scale: f32) -> Rect {
    let half = Vec2::new(width * scale / 2.0, height * scale / 2.0);
    Rect::new(center - half, center + half)
}

/// [`axis_rect`] at the world scale
#[inline]
pub fn world_rect(center: Vec2, width: f32, height: f32) -> Rect {
    axis_rect(center, width, height, SCALE)
}

/// Round to the nearest multiple of `step`, halves away from zero
#[inline]
pub fn round_to_multiple(value: f32, step: f32) -> f32 {
    step * (value / step).round()
}

/// Round to the nearest grid line
#[inline]
pub fn snap_to_grid(value: f32) -> f32 {
    round_to_multiple(value, CELL_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(32.0, 32.0));
        let b = Rect::new(Vec2::new(32.0, 0.0), Vec2::new(64.0, 32.0));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let c = Rect::new(Vec2::new(31.5, 10.0), Vec2::new(40.0, 20.0));
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_axis_rect_scales_around_center() {
        let r = axis_rect(Vec2::new(100.0, 50.0), 16.0, 8.0, 4.0);
        assert_eq!(r.min, Vec2::new(68.0, 34.0));
        assert_eq!(r.max, Vec2::new(132.0, 66.0));
        assert_eq!(r.center(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_round_to_multiple() {
        assert_eq!(round_to_multiple(47.0, 32.0), 32.0);
        assert_eq!(round_to_multiple(48.0, 32.0), 64.0);
        assert_eq!(round_to_multiple(-48.0, 32.0), -64.0);
        assert_eq!(round_to_multiple(-15.0, 32.0), 0.0);
        assert_eq!(snap_to_grid(100.0), 96.0);
    }
}
