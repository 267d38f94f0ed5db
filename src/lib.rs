//! Polyomino Tiling Engine
//!
//! Tiles a rectangular grid with polyomino pieces. The grid owns the
//! occupancy matrix, pieces own their shape and position, and four
//! strategies drive the search: greedy largest-first, random placement
//! with retry budgets, exhaustive backtracking, and randomized
//! backtracking with single-step undo. Hosts plug in through the
//! [`session::Host`] trait for grid mutation and visualization callbacks.

pub mod grid;
pub mod piece;
pub mod session;
pub mod solver;

pub use grid::{Cell, Grid};
pub use piece::Piece;
pub use session::{can_place, GridHost, Host, Pacer};
