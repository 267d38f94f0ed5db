//! Polyomino piece definitions, the standard shape catalog, and rotation.
//!
//! Each piece carries a boolean shape matrix (`true` = occupied sub-cell),
//! a position in world coordinates, and a `placed` flag. Rotation mutates
//! the shape matrix in place; four right rotations restore the original.

/// A shape literal: rows of 0/1 sub-cells.
pub type ShapeDef = &'static [&'static [u8]];

/// Single unit square.
pub const MONOMINO: ShapeDef = &[&[1]];
/// Two squares in a row.
pub const DOMINO: ShapeDef = &[&[1, 1]];
/// Straight tromino.
pub const TROMINO: ShapeDef = &[&[1, 1, 1]];
/// I tetromino.
pub const TETROMINO_I: ShapeDef = &[&[1, 1, 1, 1]];
/// O (square) tetromino.
pub const TETROMINO_O: ShapeDef = &[&[1, 1], &[1, 1]];
/// S tetromino.
pub const TETROMINO_S: ShapeDef = &[&[0, 1, 1], &[1, 1, 0]];
/// T tetromino.
pub const TETROMINO_T: ShapeDef = &[&[0, 1, 0], &[1, 1, 1]];
/// L tetromino.
pub const TETROMINO_L: ShapeDef = &[&[1, 0, 0], &[1, 1, 1]];

/// The full shape catalog with display names, for CLI listings.
pub const SHAPE_CATALOG: &[(&str, ShapeDef)] = &[
    ("monomino", MONOMINO),
    ("domino", DOMINO),
    ("tromino", TROMINO),
    ("i", TETROMINO_I),
    ("o", TETROMINO_O),
    ("s", TETROMINO_S),
    ("t", TETROMINO_T),
    ("l", TETROMINO_L),
];

/// Looks up a catalog shape by its display name (case-insensitive).
pub fn shape_by_name(name: &str) -> Option<ShapeDef> {
    let lowered = name.trim().to_ascii_lowercase();
    SHAPE_CATALOG
        .iter()
        .find(|(catalog_name, _)| *catalog_name == lowered)
        .map(|&(_, shape)| shape)
}

/// A polyomino with a mutable shape matrix and world position.
///
/// The grid is the sole source of truth for cell occupancy; `placed` only
/// records whether this piece currently contributes to it.
#[derive(Clone, Debug)]
pub struct Piece {
    /// Stable identifier, used by the grid to record cell ownership.
    pub id: usize,
    /// Occupied sub-cells, row-major. Never empty; rows are equal length.
    pub shape: Vec<Vec<bool>>,
    /// World-coordinate x of the shape's top-left corner.
    pub x: f32,
    /// World-coordinate y of the shape's top-left corner.
    pub y: f32,
    /// Whether the piece's sub-cells are currently counted in the grid.
    pub placed: bool,
    /// Cosmetic only; irrelevant to the search.
    pub color: &'static str,
}

impl Piece {
    /// Creates a piece from a shape literal at the given world position.
    pub fn new(id: usize, shape: ShapeDef, x: f32, y: f32, color: &'static str) -> Self {
        assert!(!shape.is_empty(), "shape must have at least one row");
        let width = shape[0].len();
        assert!(width > 0, "shape rows must be non-empty");
        assert!(
            shape.iter().all(|row| row.len() == width),
            "shape rows must be equal length"
        );
        let shape = shape
            .iter()
            .map(|row| row.iter().map(|&cell| cell != 0).collect())
            .collect();
        Self {
            id,
            shape,
            x,
            y,
            placed: false,
            color,
        }
    }

    /// Shape height in sub-cells.
    pub fn height(&self) -> usize {
        self.shape.len()
    }

    /// Shape width in sub-cells.
    pub fn width(&self) -> usize {
        self.shape[0].len()
    }

    /// Number of occupied sub-cells.
    pub fn cell_count(&self) -> usize {
        self.shape
            .iter()
            .map(|row| row.iter().filter(|&&filled| filled).count())
            .sum()
    }

    /// Iterates the occupied sub-cells as `(row, col)` offsets.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.shape.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &filled)| filled)
                .map(move |(c, _)| (r, c))
        })
    }

    /// Rotates the shape 90 degrees clockwise.
    ///
    /// An `H x W` matrix becomes `W x H` with
    /// `rotated[c][H - 1 - r] = shape[r][c]`. Four calls restore the
    /// original matrix; every strategy relies on that 4-cycle.
    pub fn rotate_right(&mut self) {
        let height = self.height();
        let width = self.width();
        let mut rotated = vec![vec![false; height]; width];
        for (r, row) in self.shape.iter().enumerate() {
            for (c, &filled) in row.iter().enumerate() {
                if filled {
                    rotated[c][height - 1 - r] = true;
                }
            }
        }
        self.shape = rotated;
    }

    /// Rotates the shape 90 degrees counter-clockwise.
    pub fn rotate_left(&mut self) {
        self.rotate_right();
        self.rotate_right();
        self.rotate_right();
    }

    /// Mirrors the shape horizontally.
    pub fn flip(&mut self) {
        for row in &mut self.shape {
            row.reverse();
        }
    }
}

/// Mutable placement state of a piece, captured for later restore.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceState {
    pub x: f32,
    pub y: f32,
    pub placed: bool,
}

/// Captures position and placed flag for every piece.
pub fn snapshot_states(pieces: &[Piece]) -> Vec<PieceState> {
    pieces
        .iter()
        .map(|piece| PieceState {
            x: piece.x,
            y: piece.y,
            placed: piece.placed,
        })
        .collect()
}

/// Restores a snapshot taken by [`snapshot_states`].
pub fn restore_states(pieces: &mut [Piece], states: &[PieceState]) {
    debug_assert_eq!(pieces.len(), states.len(), "snapshot length mismatch");
    for (piece, state) in pieces.iter_mut().zip(states) {
        piece.x = state.x;
        piece.y = state.y;
        piece.placed = state.placed;
    }
}
