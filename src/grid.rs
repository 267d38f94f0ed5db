//! Grid occupancy model and the bounds/overlap queries.
//!
//! The grid owns a flat `rows x cols` occupancy matrix and maps world
//! coordinates to cell indices: `col = floor((x - offset_x) / cell_size)`,
//! `row = floor((y - offset_y) / cell_size)`; sub-cell `(r, c)` of a shape
//! lands on grid cell `(row + r, col + c)`.
//!
//! `place`/`remove` are trusted mutations: the caller must have verified
//! bounds and overlap through the queries first. `remove` must run before
//! the piece is moved or rotated away from the state it was placed in,
//! otherwise stale cells are left behind; debug builds assert ownership
//! of every cleared cell to catch that desync.

use crate::piece::Piece;

/// State of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// No piece covers this cell.
    Empty,
    /// Pre-occupied by the host before the session; never owned by a piece.
    Blocked,
    /// Covered by the piece with this id.
    Piece(usize),
}

/// Rectangular occupancy grid in world coordinates.
#[derive(Clone, Debug)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    /// Side length of one cell in world units.
    pub cell_size: f32,
    /// World x of the grid's left edge.
    pub offset_x: f32,
    /// World y of the grid's top edge.
    pub offset_y: f32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid.
    pub fn new(rows: usize, cols: usize, cell_size: f32, offset_x: f32, offset_y: f32) -> Self {
        assert!(rows > 0 && cols > 0, "grid must have at least one cell");
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            rows,
            cols,
            cell_size,
            offset_x,
            offset_y,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Cell state at `(row, col)`, or `None` outside the grid.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Raw occupancy matrix, row-major. Used for search-state keys.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of non-empty cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != Cell::Empty).count()
    }

    /// Marks a cell as pre-occupied by the host.
    pub fn block(&mut self, row: usize, col: usize) {
        assert!(row < self.rows && col < self.cols, "blocked cell out of range");
        self.cells[row * self.cols + col] = Cell::Blocked;
    }

    /// Resets every cell to empty, including blocked ones.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// World position of a cell's top-left corner.
    pub fn world_pos(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.offset_x + col as f32 * self.cell_size,
            self.offset_y + row as f32 * self.cell_size,
        )
    }

    /// Grid cell under the piece's top-left corner (may be out of range).
    pub fn base_cell(&self, piece: &Piece) -> (i32, i32) {
        let row = ((piece.y - self.offset_y) / self.cell_size).floor() as i32;
        let col = ((piece.x - self.offset_x) / self.cell_size).floor() as i32;
        (row, col)
    }

    /// Whether every occupied sub-cell of the piece maps inside the grid.
    pub fn is_in_bounds(&self, piece: &Piece) -> bool {
        let (base_row, base_col) = self.base_cell(piece);
        piece.cells().all(|(r, c)| {
            let row = base_row + r as i32;
            let col = base_col + c as i32;
            row >= 0 && (row as usize) < self.rows && col >= 0 && (col as usize) < self.cols
        })
    }

    /// Whether any occupied sub-cell of the piece maps to a non-empty cell.
    ///
    /// Cells outside the grid count as occupied, so the check is safe to
    /// call on out-of-bounds pieces even though `is_in_bounds` normally
    /// runs first.
    pub fn is_overlapping(&self, piece: &Piece) -> bool {
        let (base_row, base_col) = self.base_cell(piece);
        piece.cells().any(|(r, c)| {
            let row = base_row + r as i32;
            let col = base_col + c as i32;
            if row < 0 || col < 0 {
                return true;
            }
            !matches!(self.cell_at(row as usize, col as usize), Some(Cell::Empty))
        })
    }

    /// Marks every sub-cell of the piece as owned by it.
    ///
    /// Trusted mutation: the caller has already verified bounds and
    /// non-overlap.
    pub fn place(&mut self, piece: &Piece) {
        let (base_row, base_col) = self.base_cell(piece);
        for (r, c) in piece.cells() {
            let row = (base_row + r as i32) as usize;
            let col = (base_col + c as i32) as usize;
            let idx = row * self.cols + col;
            debug_assert_eq!(
                self.cells[idx],
                Cell::Empty,
                "double-booked cell ({row}, {col})"
            );
            self.cells[idx] = Cell::Piece(piece.id);
        }
    }

    /// Clears every sub-cell of the piece back to empty.
    ///
    /// Uses the piece's current position and rotation; the piece must not
    /// have moved since it was placed.
    pub fn remove(&mut self, piece: &Piece) {
        let (base_row, base_col) = self.base_cell(piece);
        for (r, c) in piece.cells() {
            let row = (base_row + r as i32) as usize;
            let col = (base_col + c as i32) as usize;
            let idx = row * self.cols + col;
            debug_assert_eq!(
                self.cells[idx],
                Cell::Piece(piece.id),
                "removing cell ({row}, {col}) not owned by piece {}",
                piece.id
            );
            self.cells[idx] = Cell::Empty;
        }
    }

    /// Formats the occupancy matrix as text.
    ///
    /// Empty cells show as '.', blocked cells as '#', piece cells as the
    /// 1-based piece id (hex letters from 10).
    pub fn render(&self) -> String {
        let mut output = String::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let display_char = match self.cells[row * self.cols + col] {
                    Cell::Empty => '.',
                    Cell::Blocked => '#',
                    Cell::Piece(id) => {
                        let number = (id + 1) as u8;
                        if number < 10 {
                            char::from(b'0' + number)
                        } else {
                            char::from(b'A' + number - 10)
                        }
                    }
                };
                output.push(display_char);
            }
            output.push('\n');
        }
        output
    }
}
