//! Brick grid: cell geometry, live flags and per-cell tags

use glam::IVec2;
use rand::SeedableRng;
use rand::seq::index;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ProtocolError;

/// A brick cell, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < ROWS && col < COLUMNS).then_some(Self { row, col })
    }

    /// Row-major index in [0, BRICK_COUNT)
    pub fn index(&self) -> usize {
        self.row * COLUMNS + self.col
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::new(index / COLUMNS, index % COLUMNS)
    }

    /// Pixel footprint of this cell
    pub fn rect(&self) -> BrickRect {
        let left = BRICK_ORIGIN_X + BRICK_PITCH_X * self.col as i32;
        let top = BRICK_ORIGIN_Y + BRICK_PITCH_Y * self.row as i32;
        BrickRect {
            left,
            top,
            right: left + BRICK_WIDTH,
            bottom: top + BRICK_HEIGHT,
        }
    }

    /// 1-based (row, col) as carried on the wire
    pub fn to_wire(&self) -> (i32, i32) {
        (self.row as i32 + 1, self.col as i32 + 1)
    }

    pub fn from_wire(row: i32, col: i32) -> Result<Self, ProtocolError> {
        let out_of_range = ProtocolError::HitOutOfRange { row, col };
        if row < 1 || col < 1 {
            return Err(out_of_range);
        }
        Self::new(row as usize - 1, col as usize - 1).ok_or(out_of_range)
    }
}

/// Axis-aligned brick footprint. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrickRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BrickRect {
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Closest pixel of the footprint to `p`
    pub fn closest_pixel(&self, p: IVec2) -> IVec2 {
        IVec2::new(
            p.x.clamp(self.left, self.right - 1),
            p.y.clamp(self.top, self.bottom - 1),
        )
    }

    /// Whether a circle of `radius` centred on `p` covers any pixel of the footprint
    pub fn touches_circle(&self, p: IVec2, radius: i32) -> bool {
        (self.closest_pixel(p) - p).length_squared() <= radius * radius
    }
}

/// Alive flags for every cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCells {
    alive: [[bool; COLUMNS]; ROWS],
}

impl Default for LiveCells {
    fn default() -> Self {
        Self::full()
    }
}

impl LiveCells {
    pub fn full() -> Self {
        Self {
            alive: [[true; COLUMNS]; ROWS],
        }
    }

    pub fn is_alive(&self, cell: Cell) -> bool {
        self.alive[cell.row][cell.col]
    }

    /// Clear a cell. Returns false if it was already gone.
    pub fn remove(&mut self, cell: Cell) -> bool {
        std::mem::replace(&mut self.alive[cell.row][cell.col], false)
    }

    pub fn count(&self) -> usize {
        self.alive.iter().flatten().filter(|&&alive| alive).count()
    }

    /// Live cells in scan order: column by column, top row first
    pub fn scan(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..COLUMNS)
            .flat_map(|col| (0..ROWS).map(move |row| Cell { row, col }))
            .filter(|&cell| self.is_alive(cell))
    }
}

/// Tags assigned to a cell at session start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickTags {
    /// Scores double
    pub high_value: bool,
    /// Activates the power-ups when destroyed
    pub special: bool,
}

impl BrickTags {
    pub fn points(&self) -> u32 {
        if self.high_value { 2 } else { 1 }
    }
}

/// The authoritative brick grid, owned by the session engine
#[derive(Debug, Clone)]
pub struct BrickGrid {
    live: LiveCells,
    tags: [[BrickTags; COLUMNS]; ROWS],
}

impl BrickGrid {
    /// Full grid with special and high-value cells drawn from `seed`
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut tags = [[BrickTags::default(); COLUMNS]; ROWS];

        for i in index::sample(&mut rng, BRICK_COUNT, SPECIAL_BRICKS) {
            if let Some(cell) = Cell::from_index(i) {
                tags[cell.row][cell.col].special = true;
            }
        }
        for i in index::sample(&mut rng, BRICK_COUNT, HIGH_VALUE_BRICKS) {
            if let Some(cell) = Cell::from_index(i) {
                tags[cell.row][cell.col].high_value = true;
            }
        }

        Self {
            live: LiveCells::full(),
            tags,
        }
    }

    pub fn live(&self) -> &LiveCells {
        &self.live
    }

    pub fn remaining(&self) -> usize {
        self.live.count()
    }

    pub fn tags(&self, cell: Cell) -> BrickTags {
        self.tags[cell.row][cell.col]
    }

    /// Destroy a cell, returning its tags. `None` if it was already destroyed.
    pub fn destroy(&mut self, cell: Cell) -> Option<BrickTags> {
        self.live.remove(cell).then(|| self.tags(cell))
    }

    pub fn cells_where(&self, pred: impl Fn(BrickTags) -> bool) -> Vec<Cell> {
        (0..BRICK_COUNT)
            .filter_map(Cell::from_index)
            .filter(|&cell| pred(self.tags(cell)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_geometry() {
        let rect = Cell::new(0, 0).unwrap().rect();
        assert_eq!((rect.left, rect.top, rect.right, rect.bottom), (65, 65, 105, 80));

        let rect = Cell::new(7, 9).unwrap().rect();
        assert_eq!((rect.left, rect.top), (470, 205));
        assert_eq!((rect.right, rect.bottom), (510, 220));
        // Last column still fits inside the arena
        assert!(rect.right < ARENA_RIGHT);
    }

    #[test]
    fn test_wire_coordinates() {
        let cell = Cell::new(3, 4).unwrap();
        assert_eq!(cell.to_wire(), (4, 5));
        assert_eq!(Cell::from_wire(4, 5).unwrap(), cell);
        assert!(Cell::from_wire(0, 1).is_err());
        assert!(Cell::from_wire(9, 1).is_err());
        assert!(Cell::from_wire(1, 11).is_err());
    }

    #[test]
    fn test_scan_order_is_column_major() {
        let live = LiveCells::full();
        let first: Vec<_> = live.scan().take(ROWS + 1).collect();
        assert_eq!(first[0], Cell { row: 0, col: 0 });
        assert_eq!(first[1], Cell { row: 1, col: 0 });
        assert_eq!(first[ROWS], Cell { row: 0, col: 1 });
    }

    #[test]
    fn test_scan_skips_dead_cells() {
        let mut live = LiveCells::full();
        assert!(live.remove(Cell { row: 0, col: 0 }));
        assert!(!live.remove(Cell { row: 0, col: 0 }));
        assert_eq!(live.scan().next(), Some(Cell { row: 1, col: 0 }));
        assert_eq!(live.count(), BRICK_COUNT - 1);
    }

    #[test]
    fn test_tags_are_distinct_and_seeded() {
        let grid = BrickGrid::new(1234);
        assert_eq!(grid.cells_where(|t| t.special).len(), SPECIAL_BRICKS);
        assert_eq!(grid.cells_where(|t| t.high_value).len(), HIGH_VALUE_BRICKS);

        let again = BrickGrid::new(1234);
        assert_eq!(
            grid.cells_where(|t| t.special),
            again.cells_where(|t| t.special)
        );
    }

    #[test]
    fn test_destroy_is_one_shot() {
        let mut grid = BrickGrid::new(0);
        let cell = Cell::new(2, 2).unwrap();
        assert!(grid.destroy(cell).is_some());
        assert!(grid.destroy(cell).is_none());
        assert_eq!(grid.remaining(), BRICK_COUNT - 1);
    }

    #[test]
    fn test_touches_circle() {
        let rect = Cell::new(0, 0).unwrap().rect();
        // Directly below the bottom face, 7px from the last brick row
        assert!(rect.touches_circle(IVec2::new(80, 86), 7));
        assert!(!rect.touches_circle(IVec2::new(80, 87), 7));
        // Diagonal off the bottom-right corner (104, 79)
        assert!(rect.touches_circle(IVec2::new(108, 84), 7));
        assert!(!rect.touches_circle(IVec2::new(110, 85), 7));
    }
}
