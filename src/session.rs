//! Host capability surface, the placement predicate, and cooperative pacing.
//!
//! The strategies never touch a UI directly; they talk to a [`Host`] that
//! owns the grid and whatever visualization sits on top of it. A no-frills
//! [`GridHost`] covers headless use (CLI, tests, benches).

use crate::grid::Grid;
use crate::piece::Piece;

/// Capabilities a strategy needs from its host.
///
/// `place`/`remove` are the grid-mutation entry points; the notifications
/// default to no-ops so a headless host only implements the first three
/// methods. The engine is not reentrant: one strategy invocation owns the
/// host for its whole run.
pub trait Host {
    /// Read access to the grid for legality queries.
    fn grid(&self) -> &Grid;

    /// Marks the piece's cells occupied. Bounds and overlap are already
    /// verified by the caller.
    fn place(&mut self, piece: &Piece);

    /// Clears the piece's cells, using its current position and rotation.
    fn remove(&mut self, piece: &Piece);

    /// Called after each meaningful step, purely for visualization.
    fn notify_redraw(&mut self) {}

    /// Called once at the end of a strategy run; see each strategy for
    /// whether it fires unconditionally or only on success.
    fn notify_done(&mut self) {}

    /// Cooperative suspension point, reached when the pacer's frame
    /// budget runs out. Has no effect on search results.
    fn yield_now(&mut self) {}
}

/// Minimal host: a bare grid with no-op notifications.
#[derive(Clone, Debug)]
pub struct GridHost {
    pub grid: Grid,
}

impl GridHost {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }
}

impl Host for GridHost {
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn place(&mut self, piece: &Piece) {
        self.grid.place(piece);
    }

    fn remove(&mut self, piece: &Piece) {
        self.grid.remove(piece);
    }
}

/// Counts predicate evaluations and cedes control every `frame_budget`
/// steps.
///
/// An explicit value threaded through each strategy call, not process-wide
/// state; suspension is a pure function of steps since the last yield.
/// A budget of 0 disables pacing.
#[derive(Clone, Copy, Debug)]
pub struct Pacer {
    steps_since_yield: u32,
    frame_budget: u32,
}

impl Pacer {
    pub fn new(frame_budget: u32) -> Self {
        Self {
            steps_since_yield: 0,
            frame_budget,
        }
    }

    /// Records one predicate evaluation, yielding to the host when the
    /// budget is reached.
    pub fn step<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.frame_budget == 0 {
            return;
        }
        self.steps_since_yield += 1;
        if self.steps_since_yield >= self.frame_budget {
            self.steps_since_yield = 0;
            host.yield_now();
        }
    }
}

/// The legality oracle: could the piece sit at `(x, y)` in its current
/// rotation?
///
/// Sets a trial position, checks bounds and overlap, then restores the
/// original position whatever the outcome. Never mutates the grid. Every
/// strategy routes its legality checks through here.
pub fn can_place(grid: &Grid, piece: &mut Piece, x: f32, y: f32) -> bool {
    let original_x = piece.x;
    let original_y = piece.y;

    piece.x = x;
    piece.y = y;
    let legal = grid.is_in_bounds(piece) && !grid.is_overlapping(piece);
    piece.x = original_x;
    piece.y = original_y;

    legal
}
