//! Fixed navigation grid
//!
//! Row-major tile map with precomputed 8-connected neighbor lists. Cell
//! (row, col) covers world x in [col, col + 1) * CELL_SIZE and y in
//! [row, row + 1) * CELL_SIZE.

use serde::{Deserialize, Serialize};

use crate::Vector;
use crate::consts::{CELL_SIZE, DIAGONAL_COST, GRID_HEIGHT, GRID_WIDTH, STRAIGHT_COST};
use crate::sim::HidingKind;

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellContent {
    #[default]
    Open,
    /// Never entered, never left
    Wall,
    /// Can be entered but has no outgoing edges
    Door,
    HidingSpot(HidingKind),
}

#[derive(Debug, Clone)]
pub struct NavGrid {
    width: usize,
    height: usize,
    cells: Vec<CellContent>,
    /// (neighbor, edge weight) per cell, same indexing as `cells`
    neighbors: Vec<Vec<(Cell, f64)>>,
}

impl NavGrid {
    /// Standard 100x100 grid from row-major cell contents.
    /// Panics if `cells` has the wrong length.
    pub fn new(cells: Vec<CellContent>) -> Self {
        Self::with_dimensions(GRID_WIDTH, GRID_HEIGHT, cells)
    }

    pub fn with_dimensions(width: usize, height: usize, cells: Vec<CellContent>) -> Self {
        assert!(width > 0 && height > 0, "grid must have at least one cell");
        assert_eq!(
            cells.len(),
            width * height,
            "expected {} cells for a {}x{} grid",
            width * height,
            width,
            height
        );

        let mut grid = Self {
            width,
            height,
            cells,
            neighbors: Vec::new(),
        };
        grid.neighbors = (0..width * height)
            .map(|idx| grid.build_neighbors(grid.cell_of(idx)))
            .collect();
        grid
    }

    /// Fully open standard grid
    pub fn open() -> Self {
        Self::new(vec![CellContent::Open; GRID_WIDTH * GRID_HEIGHT])
    }

    /// Standard grid with `walls` filled in and everything else open.
    /// Panics on a wall outside the grid.
    pub fn from_walls(walls: impl IntoIterator<Item = Cell>) -> Self {
        let mut cells = vec![CellContent::Open; GRID_WIDTH * GRID_HEIGHT];
        for wall in walls {
            assert!(
                wall.row < GRID_HEIGHT && wall.col < GRID_WIDTH,
                "wall {wall:?} outside grid"
            );
            cells[wall.row * GRID_WIDTH + wall.col] = CellContent::Wall;
        }
        Self::new(cells)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    #[inline]
    fn idx(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    #[inline]
    fn cell_of(&self, idx: usize) -> Cell {
        Cell::new(idx / self.width, idx % self.width)
    }

    /// Dense index for per-cell scratch arrays
    #[inline]
    pub(crate) fn index_of(&self, cell: Cell) -> usize {
        self.idx(cell)
    }

    #[inline]
    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell containing a world position, `None` outside the grid
    pub fn cell_at(&self, pos: Vector) -> Option<Cell> {
        let col = (pos.x / CELL_SIZE).floor();
        let row = (pos.y / CELL_SIZE).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let cell = Cell::new(row as usize, col as usize);
        self.in_bounds(cell).then_some(cell)
    }

    /// World-space center of a cell
    pub fn cell_center(&self, cell: Cell) -> Vector {
        Vector::new(
            CELL_SIZE * 0.5 + cell.col as f64 * CELL_SIZE,
            CELL_SIZE * 0.5 + cell.row as f64 * CELL_SIZE,
        )
    }

    /// Panics on an out-of-bounds cell.
    pub fn content(&self, cell: Cell) -> CellContent {
        self.cells[self.idx(cell)]
    }

    /// Outgoing edges of `cell`. Panics on an out-of-bounds cell.
    pub fn neighbors(&self, cell: Cell) -> &[(Cell, f64)] {
        &self.neighbors[self.idx(cell)]
    }

    /// Open floor or a hiding spot
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell)
            && matches!(
                self.content(cell),
                CellContent::Open | CellContent::HidingSpot(_)
            )
    }

    /// Walkable cells within `radius` cells of `center`
    ///
    /// The outermost ring of the grid is never returned. Row-major order.
    pub fn cells_within(&self, center: Cell, radius: usize) -> Vec<Cell> {
        let row_lo = center.row.saturating_sub(radius).max(1);
        let col_lo = center.col.saturating_sub(radius).max(1);
        let row_hi = (center.row + radius).min(self.height.saturating_sub(2));
        let col_hi = (center.col + radius).min(self.width.saturating_sub(2));
        let center_pos = self.cell_center(center);
        let reach = radius as f64 * CELL_SIZE;

        let mut cells = Vec::new();
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let cell = Cell::new(row, col);
                if self.is_walkable(cell) && self.cell_center(cell).distance(center_pos) <= reach {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    fn build_neighbors(&self, cell: Cell) -> Vec<(Cell, f64)> {
        if matches!(self.content(cell), CellContent::Wall | CellContent::Door) {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(8);
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (Some(row), Some(col)) = (
                    cell.row.checked_add_signed(dr),
                    cell.col.checked_add_signed(dc),
                ) else {
                    continue;
                };
                let next = Cell::new(row, col);
                if !self.in_bounds(next) || self.content(next) == CellContent::Wall {
                    continue;
                }
                let cost = if dr != 0 && dc != 0 {
                    DIAGONAL_COST
                } else {
                    STRAIGHT_COST
                };
                out.push((next, cost));
            }
        }
        out
    }
}
