//! Arena tiles and their 2x2 sub-tile damage mask

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::geometry::{Rect, world_rect};
use crate::consts::{BLOCK_SIZE, CELL_SIZE, GRID_ROWS};

/// Tile types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Border,
    Brick,
    Steel,
    Water,
    Headquarters,
    Trees,
    Space,
}

impl TileKind {
    /// Parse a stage-file symbol
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '|' => Some(TileKind::Border),
            'b' => Some(TileKind::Brick),
            's' => Some(TileKind::Steel),
            'w' => Some(TileKind::Water),
            'h' => Some(TileKind::Headquarters),
            't' => Some(TileKind::Trees),
            ' ' => Some(TileKind::Space),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            TileKind::Border => '|',
            TileKind::Brick => 'b',
            TileKind::Steel => 's',
            TileKind::Water => 'w',
            TileKind::Headquarters => 'h',
            TileKind::Trees => 't',
            TileKind::Space => ' ',
        }
    }

    /// Can a bullet damage it
    pub fn destroyable(self) -> bool {
        matches!(self, TileKind::Brick | TileKind::Headquarters)
    }

    /// Can a tank drive through it
    pub fn passable(self) -> bool {
        matches!(self, TileKind::Trees | TileKind::Space)
    }

    /// Can a bullet fly through it
    pub fn shootable(self) -> bool {
        matches!(self, TileKind::Water | TileKind::Trees | TileKind::Space)
    }
}

/// One row or column of the quadrant mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadrantLine {
    /// Horizontal pair, `0` is the bottom row
    Row(usize),
    /// Vertical pair, `0` is the left column
    Column(usize),
}

impl QuadrantLine {
    /// The line a bullet travelling in `direction` strikes first, and the one behind it
    pub fn near_and_far(direction: Direction) -> (QuadrantLine, QuadrantLine) {
        match direction {
            Direction::North => (QuadrantLine::Row(0), QuadrantLine::Row(1)),
            Direction::South => (QuadrantLine::Row(1), QuadrantLine::Row(0)),
            Direction::East => (QuadrantLine::Column(0), QuadrantLine::Column(1)),
            Direction::West => (QuadrantLine::Column(1), QuadrantLine::Column(0)),
        }
    }

    fn cells(self) -> [(usize, usize); 2] {
        match self {
            QuadrantLine::Row(y) => [(0, y), (1, y)],
            QuadrantLine::Column(x) => [(x, 0), (x, 1)],
        }
    }
}

/// 2x2 damage mask indexed `[x][y]`; `true` means the quarter is still standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quadrants(pub [[bool; 2]; 2]);

impl Quadrants {
    pub const FULL: Quadrants = Quadrants([[true, true], [true, true]]);
    pub const EMPTY: Quadrants = Quadrants([[false, false], [false, false]]);

    pub fn is_empty(&self) -> bool {
        *self == Quadrants::EMPTY
    }

    pub fn standing(&self) -> usize {
        self.0.iter().flatten().filter(|q| **q).count()
    }

    /// True if both quarters on `line` are already gone
    pub fn line_cleared(&self, line: QuadrantLine) -> bool {
        line.cells().iter().all(|&(x, y)| !self.0[x][y])
    }

    /// Knock out both quarters on `line`. Quarters never come back.
    pub fn cleared(mut self, line: QuadrantLine) -> Self {
        for (x, y) in line.cells() {
            self.0[x][y] = false;
        }
        self
    }
}

/// A single grid cell. Tiles are replaced wholesale, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub row: usize,
    pub column: usize,
    /// World-space centre
    pub pos: Vec2,
    /// Only meaningful for destroyable kinds
    pub quadrants: Quadrants,
}

impl Tile {
    pub fn new(kind: TileKind, row: usize, column: usize) -> Self {
        let quadrants = if kind == TileKind::Brick {
            Quadrants::FULL
        } else {
            Quadrants::EMPTY
        };
        Self {
            kind,
            row,
            column,
            pos: cell_center(row, column),
            quadrants,
        }
    }

    pub fn destroyable(&self) -> bool {
        self.kind.destroyable()
    }

    pub fn passable(&self) -> bool {
        self.kind.passable()
    }

    pub fn shootable(&self) -> bool {
        self.kind.shootable()
    }

    pub fn rect(&self) -> Rect {
        world_rect(self.pos, BLOCK_SIZE, BLOCK_SIZE)
    }

    /// Same cell with a new damage mask
    pub fn with_quadrants(self, quadrants: Quadrants) -> Self {
        Self { quadrants, ..self }
    }

    /// A fresh tile of another kind in the same cell
    pub fn replaced_by(&self, kind: TileKind) -> Self {
        Tile::new(kind, self.row, self.column)
    }
}

/// World-space centre of cell (`row`, `column`); row 0 is the top of the arena
pub fn cell_center(row: usize, column: usize) -> Vec2 {
    let half = CELL_SIZE / 2.0;
    Vec2::new(
        column as f32 * CELL_SIZE + half,
        (GRID_ROWS - row) as f32 * CELL_SIZE - half,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_traits() {
        let t = |k: TileKind| (k.destroyable(), k.passable(), k.shootable());
        assert_eq!(t(TileKind::Border), (false, false, false));
        assert_eq!(t(TileKind::Brick), (true, false, false));
        assert_eq!(t(TileKind::Steel), (false, false, false));
        assert_eq!(t(TileKind::Water), (false, false, true));
        assert_eq!(t(TileKind::Headquarters), (true, false, false));
        assert_eq!(t(TileKind::Trees), (false, true, true));
        assert_eq!(t(TileKind::Space), (false, true, true));
    }

    #[test]
    fn test_symbol_roundtrip() {
        for kind in [
            TileKind::Border,
            TileKind::Brick,
            TileKind::Steel,
            TileKind::Water,
            TileKind::Headquarters,
            TileKind::Trees,
            TileKind::Space,
        ] {
            assert_eq!(TileKind::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(TileKind::from_symbol('x'), None);
    }

    #[test]
    fn test_cell_center() {
        assert_eq!(cell_center(0, 0), Vec2::new(16.0, 944.0));
        assert_eq!(cell_center(29, 29), Vec2::new(944.0, 16.0));
        let tile = Tile::new(TileKind::Steel, 29, 0);
        assert_eq!(tile.rect().min, Vec2::ZERO);
        assert_eq!(tile.rect().max, Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_brick_starts_full() {
        assert_eq!(Tile::new(TileKind::Brick, 3, 3).quadrants, Quadrants::FULL);
        assert!(Tile::new(TileKind::Space, 3, 3).quadrants.is_empty());
    }

    #[test]
    fn test_clearing_lines() {
        let q = Quadrants::FULL.cleared(QuadrantLine::Row(0));
        assert_eq!(q, Quadrants([[false, true], [false, true]]));
        assert!(q.line_cleared(QuadrantLine::Row(0)));
        assert!(!q.line_cleared(QuadrantLine::Column(0)));
        assert_eq!(q.standing(), 2);
        let q = q.cleared(QuadrantLine::Column(1));
        assert_eq!(q, Quadrants([[false, true], [false, false]]));
    }
}
