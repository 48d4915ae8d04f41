//! The 30x30 destructible arena
//!
//! Cells are addressed by (row, column). Mutations always replace a whole
//! tile and raise the `changed` flag so the host knows to redraw terrain.

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::geometry::Rect;
use super::tile::{QuadrantLine, Tile, TileKind};
use crate::consts::{CELL_SIZE, GRID_COLUMNS, GRID_ROWS};
use crate::error::StageError;

/// Address of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// The four cells holding the headquarters
pub const HQ_CELLS: [Cell; 4] = [
    Cell::new(26, 14),
    Cell::new(26, 15),
    Cell::new(27, 14),
    Cell::new(27, 15),
];

/// The wall ring around the headquarters
pub const HQ_ARMOR_CELLS: [Cell; 8] = [
    Cell::new(25, 13),
    Cell::new(25, 14),
    Cell::new(25, 15),
    Cell::new(25, 16),
    Cell::new(26, 13),
    Cell::new(26, 16),
    Cell::new(27, 13),
    Cell::new(27, 16),
];

/// Arena terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    tiles: Vec<Tile>,
    /// Tile kinds the armor ring had before it was turned to steel
    saved_armor: Option<[TileKind; 8]>,
    hq_destroyed: bool,
    #[serde(skip)]
    changed: bool,
}

impl Grid {
    /// Build the arena from a parsed stage: exactly 30 rows of 30 known symbols
    pub fn from_symbols<S: AsRef<[char]>>(rows: &[S]) -> Result<Self, StageError> {
        if rows.len() != GRID_ROWS {
            return Err(StageError::InvalidFormat(format!(
                "expected {GRID_ROWS} rows, found {}",
                rows.len()
            )));
        }
        let mut tiles = Vec::with_capacity(GRID_ROWS * GRID_COLUMNS);
        for (row, symbols) in rows.iter().enumerate() {
            let symbols = symbols.as_ref();
            if symbols.len() != GRID_COLUMNS {
                return Err(StageError::InvalidFormat(format!(
                    "row {row} has {} columns, expected {GRID_COLUMNS}",
                    symbols.len()
                )));
            }
            for (column, &symbol) in symbols.iter().enumerate() {
                let kind = TileKind::from_symbol(symbol).ok_or(StageError::UnknownSymbol {
                    symbol,
                    row,
                    column,
                })?;
                tiles.push(Tile::new(kind, row, column));
            }
        }
        Ok(Self {
            tiles,
            saved_armor: None,
            hq_destroyed: false,
            changed: true,
        })
    }

    fn index(cell: Cell) -> usize {
        cell.row * GRID_COLUMNS + cell.column
    }

    pub fn tile(&self, cell: Cell) -> &Tile {
        &self.tiles[Self::index(cell)]
    }

    /// Replace the tile at `cell` (the new tile keeps its own row/column)
    pub fn set(&mut self, tile: Tile) {
        let cell = Cell::new(tile.row, tile.column);
        self.tiles[Self::index(cell)] = tile;
        self.changed = true;
    }

    /// Terrain changed since the last call
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn is_hq_armored(&self) -> bool {
        self.saved_armor.is_some()
    }

    pub fn is_hq_destroyed(&self) -> bool {
        self.hq_destroyed
    }

    /// Tiles whose rectangle overlaps `rect` with positive area, in row-major order
    pub fn tiles_overlapping(&self, rect: Rect) -> impl Iterator<Item = &Tile> + '_ {
        let max_index = |n: usize| n as f32 - 1.0;
        let col_lo = (rect.min.x / CELL_SIZE).floor().clamp(0.0, max_index(GRID_COLUMNS)) as usize;
        let col_hi = (rect.max.x / CELL_SIZE).floor().clamp(0.0, max_index(GRID_COLUMNS)) as usize;
        // y grows upward while rows grow downward
        let band = |y: f32| {
            let from_bottom = (y / CELL_SIZE).floor().clamp(0.0, max_index(GRID_ROWS)) as usize;
            GRID_ROWS - 1 - from_bottom
        };
        let row_lo = band(rect.max.y);
        let row_hi = band(rect.min.y);
        (row_lo..=row_hi)
            .flat_map(move |row| (col_lo..=col_hi).map(move |column| Cell::new(row, column)))
            .map(move |cell| self.tile(cell))
            .filter(move |tile| tile.rect().intersects(&rect))
    }

    /// True if `rect` overlaps any tile a tank cannot enter
    pub fn blocks_tank(&self, rect: Rect) -> bool {
        self.tiles_overlapping(rect).any(|tile| !tile.passable())
    }

    /// Turn a cell into open ground
    pub fn destroy_tile(&mut self, cell: Cell) {
        let space = self.tile(cell).replaced_by(TileKind::Space);
        self.set(space);
    }

    /// Knock out one row or column of quarters from `first` (and `second`, when the
    /// bullet straddles two tiles).
    ///
    /// The line facing the bullet goes first. Once that line is gone on every
    /// struck tile, the far line is cleared instead.
    pub fn apply_quadrant_damage(&mut self, first: Cell, second: Option<Cell>, direction: Direction) {
        let second = second.unwrap_or(first);
        let a = self.tile(first).quadrants;
        let b = self.tile(second).quadrants;
        let (near, far) = QuadrantLine::near_and_far(direction);
        let line = if a.line_cleared(near) && b.line_cleared(near) {
            far
        } else {
            near
        };
        for cell in [first, second] {
            let tile = *self.tile(cell);
            self.set(tile.with_quadrants(tile.quadrants.cleared(line)));
        }
    }

    /// Turn the ring around the headquarters into steel, remembering what was there
    pub fn armor_headquarters(&mut self) {
        if self.saved_armor.is_none() {
            self.saved_armor = Some(HQ_ARMOR_CELLS.map(|cell| self.tile(cell).kind));
        }
        for cell in HQ_ARMOR_CELLS {
            let steel = self.tile(cell).replaced_by(TileKind::Steel);
            self.set(steel);
        }
    }

    /// Put back the ring as it was before armoring, with walls freshly rebuilt
    pub fn disarm_headquarters(&mut self) {
        let Some(kinds) = self.saved_armor.take() else {
            return;
        };
        for (cell, kind) in HQ_ARMOR_CELLS.into_iter().zip(kinds) {
            let tile = self.tile(cell).replaced_by(kind);
            self.set(tile);
        }
    }

    pub fn destroy_headquarters(&mut self) {
        for cell in HQ_CELLS {
            self.destroy_tile(cell);
        }
        self.hq_destroyed = true;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::Vec2;

    /// Border ring two cells thick, HQ with a brick ring, open field otherwise
    pub(crate) fn arena_rows() -> Vec<Vec<char>> {
        let mut rows = vec![vec![' '; GRID_COLUMNS]; GRID_ROWS];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, symbol) in row.iter_mut().enumerate() {
                if r < 2 || r >= GRID_ROWS - 2 || c < 2 || c >= GRID_COLUMNS - 2 {
                    *symbol = '|';
                }
            }
        }
        for cell in HQ_ARMOR_CELLS {
            rows[cell.row][cell.column] = 'b';
        }
        for cell in HQ_CELLS {
            rows[cell.row][cell.column] = 'h';
        }
        rows
    }

    pub(crate) fn arena() -> Grid {
        Grid::from_symbols(&arena_rows()).unwrap()
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let mut rows = arena_rows();
        rows.pop();
        assert!(matches!(
            Grid::from_symbols(&rows),
            Err(StageError::InvalidFormat(_))
        ));

        let mut rows = arena_rows();
        rows[4].push(' ');
        assert!(matches!(
            Grid::from_symbols(&rows),
            Err(StageError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_symbol() {
        let mut rows = arena_rows();
        rows[5][7] = '?';
        match Grid::from_symbols(&rows) {
            Err(StageError::UnknownSymbol { symbol, row, column }) => {
                assert_eq!((symbol, row, column), ('?', 5, 7));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_destroy_tile_signals_change() {
        let mut grid = arena();
        assert!(grid.take_changed());
        assert!(!grid.take_changed());
        grid.destroy_tile(Cell::new(25, 13));
        assert_eq!(grid.tile(Cell::new(25, 13)).kind, TileKind::Space);
        assert!(grid.take_changed());
    }

    #[test]
    fn test_tiles_overlapping_finds_exact_cells() {
        let grid = arena();
        // Tank-sized box centred on a grid corner covers exactly four cells
        let rect = Rect::new(Vec2::new(320.0, 320.0), Vec2::new(384.0, 384.0));
        let cells: Vec<_> = grid
            .tiles_overlapping(rect)
            .map(|t| (t.row, t.column))
            .collect();
        assert_eq!(cells, vec![(18, 10), (18, 11), (19, 10), (19, 11)]);
    }

    #[test]
    fn test_near_line_cleared_first() {
        let mut grid = arena();
        let cell = Cell::new(25, 14);
        grid.apply_quadrant_damage(cell, None, Direction::North);
        assert_eq!(
            grid.tile(cell).quadrants.0,
            [[false, true], [false, true]]
        );
        grid.apply_quadrant_damage(cell, None, Direction::North);
        assert!(grid.tile(cell).quadrants.is_empty());
    }

    #[test]
    fn test_damage_propagates_to_undamaged_half() {
        let mut grid = arena();
        let a = Cell::new(25, 14);
        let b = Cell::new(25, 15);
        // Only `a` has its left column gone, so an eastward hit still takes the near column
        grid.apply_quadrant_damage(a, None, Direction::East);
        grid.apply_quadrant_damage(a, Some(b), Direction::East);
        assert!(grid.tile(a).quadrants.line_cleared(QuadrantLine::Column(0)));
        assert!(grid.tile(b).quadrants.line_cleared(QuadrantLine::Column(0)));
        assert!(!grid.tile(a).quadrants.line_cleared(QuadrantLine::Column(1)));

        // Now the near column is gone on both, so the far one goes
        grid.apply_quadrant_damage(a, Some(b), Direction::East);
        assert!(grid.tile(a).quadrants.is_empty());
        assert!(grid.tile(b).quadrants.is_empty());
    }

    #[test]
    fn test_armor_roundtrip_restores_kinds() {
        let mut grid = arena();
        grid.destroy_tile(Cell::new(25, 13));
        let before: Vec<_> = HQ_ARMOR_CELLS.iter().map(|&c| grid.tile(c).kind).collect();

        grid.armor_headquarters();
        assert!(grid.is_hq_armored());
        assert!(HQ_ARMOR_CELLS
            .iter()
            .all(|&c| grid.tile(c).kind == TileKind::Steel));

        // Re-armoring while armored keeps the original record
        grid.armor_headquarters();
        grid.disarm_headquarters();
        let after: Vec<_> = HQ_ARMOR_CELLS.iter().map(|&c| grid.tile(c).kind).collect();
        assert_eq!(before, after);
        assert!(!grid.is_hq_armored());
    }

    #[test]
    fn test_destroy_headquarters() {
        let mut grid = arena();
        grid.destroy_headquarters();
        assert!(grid.is_hq_destroyed());
        assert!(HQ_CELLS
            .iter()
            .all(|&c| grid.tile(c).kind == TileKind::Space));
    }
}
