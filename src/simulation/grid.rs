//! Deterministic road grid generation
//!
//! Every cell starts out as wall and a fixed set of carving rules turns
//! cells into road. The layout depends only on the grid dimensions, so
//! repeated calls with the same dimensions produce identical grids.

use super::types::Point;

/// Main horizontal road bands: two rows wide, every 12 rows starting at row 8
const MAIN_ROW_START: usize = 8;
const MAIN_ROW_SPACING: usize = 12;

/// Main vertical road bands: two columns wide, every 16 columns starting at
/// column 8
const MAIN_COL_START: usize = 8;
const MAIN_COL_SPACING: usize = 16;

/// Single-row connectors every 24 rows starting at row 4
const CONNECTOR_ROW_START: usize = 4;
const CONNECTOR_ROW_SPACING: usize = 24;

/// Single-column connectors every 32 columns starting at column 4
const CONNECTOR_COL_START: usize = 4;
const CONNECTOR_COL_SPACING: usize = 32;

/// A single cell of the road grid
///
/// `is_wall` and `is_road` are mutually exclusive: carving a cell flips both
/// flags at once and nothing else ever touches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub is_wall: bool,
    pub is_road: bool,
}

/// Fixed-size road grid, immutable after generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<GridCell>,
}

impl Grid {
    fn new_walled(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![
                GridCell {
                    is_wall: true,
                    is_road: false,
                };
                rows * cols
            ],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x < self.cols && p.y < self.rows
    }

    /// The cell at `p`; panics when `p` is out of bounds
    pub fn cell(&self, p: Point) -> GridCell {
        self.cells[p.y * self.cols + p.x]
    }

    /// Whether `p` is a road cell; out-of-bounds points are not road
    pub fn is_road(&self, p: Point) -> bool {
        self.contains(p) && self.cell(p).is_road
    }

    /// Whether `p` is a wall cell; out-of-bounds points count as wall
    pub fn is_wall(&self, p: Point) -> bool {
        !self.is_road(p)
    }

    /// All road cells in row-major order
    pub fn road_cells(&self) -> Vec<Point> {
        let mut cells = Vec::new();
        for y in 0..self.rows {
            for x in 0..self.cols {
                let p = Point::new(x, y);
                if self.cell(p).is_road {
                    cells.push(p);
                }
            }
        }
        cells
    }

    fn carve(&mut self, x: usize, y: usize) {
        self.cells[y * self.cols + x] = GridCell {
            is_wall: false,
            is_road: true,
        };
    }

    fn carve_row(&mut self, y: usize) {
        for x in 0..self.cols {
            self.carve(x, y);
        }
    }

    fn carve_col(&mut self, x: usize) {
        for y in 0..self.rows {
            self.carve(x, y);
        }
    }
}

/// Build the static road network
///
/// Pure function: no randomness, no side effects. Overlapping carving rules
/// are an idempotent union, so rule order does not matter.
pub fn generate_grid(rows: usize, cols: usize) -> Grid {
    let mut grid = Grid::new_walled(rows, cols);

    for y in (MAIN_ROW_START..rows).step_by(MAIN_ROW_SPACING) {
        grid.carve_row(y);
        if y + 1 < rows {
            grid.carve_row(y + 1);
        }
    }

    for x in (MAIN_COL_START..cols).step_by(MAIN_COL_SPACING) {
        grid.carve_col(x);
        if x + 1 < cols {
            grid.carve_col(x + 1);
        }
    }

    for y in (CONNECTOR_ROW_START..rows).step_by(CONNECTOR_ROW_SPACING) {
        grid.carve_row(y);
    }

    for x in (CONNECTOR_COL_START..cols).step_by(CONNECTOR_COL_SPACING) {
        grid.carve_col(x);
    }

    grid
}
