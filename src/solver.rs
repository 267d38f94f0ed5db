//! The four placement strategies.
//!
//! All strategies share one legality oracle ([`can_place`]), one scan
//! order (rotation as the outer loop, row-major cells inner, so every
//! cell is tried at rotation 0 before any cell at rotation 1), and one
//! host surface for grid mutation and visualization callbacks. Failure
//! is communicated through return values, never through panics.

use std::cmp::Reverse;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;

use crate::grid::Cell;
use crate::piece::{restore_states, snapshot_states, Piece};
use crate::session::{can_place, Host, Pacer};

/// Random draws a piece gets before it is put back on the stack.
pub const RANDOM_ATTEMPTS_PER_PIECE: usize = 100;

/// Consecutive piece failures before the random strategy gives up.
pub const MAX_CONSECUTIVE_FAILS: usize = 100;

/// Tries one piece in every cell and rotation, placing it at the first fit.
///
/// Rotates the piece itself between full grid scans; after four failed
/// scans the shape has cycled back to its original orientation and the
/// position is untouched.
fn try_place_with_rotations<H: Host>(piece: &mut Piece, host: &mut H, pacer: &mut Pacer) -> bool {
    let rows = host.grid().rows;
    let cols = host.grid().cols;

    for _rotation in 0..4 {
        for row in 0..rows {
            for col in 0..cols {
                pacer.step(host);
                let (x, y) = host.grid().world_pos(row, col);
                if can_place(host.grid(), piece, x, y) {
                    piece.x = x;
                    piece.y = y;
                    host.place(piece);
                    piece.placed = true;
                    return true;
                }
            }
        }
        piece.rotate_right();
    }
    false
}

/// Greedy largest-first tiling.
///
/// Sorts a copy of the piece order by cell count descending and gives
/// each piece one full cell-by-rotation scan. A piece with no legal spot
/// is skipped; failure is local, there is no backtracking. Returns the
/// number of pieces placed. Notifies completion unconditionally.
pub fn greedy_tiling<H: Host>(pieces: &mut [Piece], host: &mut H, pacer: &mut Pacer) -> usize {
    debug_assert!(
        pieces.iter().all(|piece| !piece.placed),
        "session pieces must start unplaced"
    );

    let mut order: Vec<usize> = (0..pieces.len()).collect();
    order.sort_by_key(|&i| Reverse(pieces[i].cell_count()));

    let mut placed_count = 0;
    for &i in &order {
        if try_place_with_rotations(&mut pieces[i], host, pacer) {
            placed_count += 1;
            host.notify_redraw();
        } else {
            debug!("greedy: no legal cell for piece {}", pieces[i].id);
        }
    }

    host.notify_redraw();
    host.notify_done();
    placed_count
}

/// Random placement with retry budgets.
///
/// Pieces wait on a stack; the top piece gets up to
/// [`RANDOM_ATTEMPTS_PER_PIECE`] uniform cell draws in its current
/// rotation. A piece that exhausts its draws goes back on the stack and
/// bumps a global consecutive-failure counter (reset by any success);
/// the counter reaching [`MAX_CONSECUTIVE_FAILS`] declares the session
/// stuck. Returns whether every piece was placed. Notifies completion
/// unconditionally.
pub fn random_tiling<H: Host, R: Rng>(
    pieces: &mut [Piece],
    host: &mut H,
    pacer: &mut Pacer,
    rng: &mut R,
) -> bool {
    debug_assert!(
        pieces.iter().all(|piece| !piece.placed),
        "session pieces must start unplaced"
    );

    let mut stack: Vec<usize> = (0..pieces.len()).collect();
    let mut consecutive_fails = 0;

    while let Some(i) = stack.pop() {
        let mut placed = false;
        for _ in 0..RANDOM_ATTEMPTS_PER_PIECE {
            pacer.step(host);
            let row = rng.random_range(0..host.grid().rows);
            let col = rng.random_range(0..host.grid().cols);
            let (x, y) = host.grid().world_pos(row, col);
            if can_place(host.grid(), &mut pieces[i], x, y) {
                pieces[i].x = x;
                pieces[i].y = y;
                host.place(&pieces[i]);
                pieces[i].placed = true;
                host.notify_redraw();
                placed = true;
                break;
            }
        }

        if placed {
            consecutive_fails = 0;
        } else {
            stack.push(i);
            consecutive_fails += 1;
            debug!(
                "random: piece {} exhausted its draws ({consecutive_fails} consecutive fails)",
                pieces[i].id
            );
            if consecutive_fails >= MAX_CONSECUTIVE_FAILS {
                host.notify_redraw();
                host.notify_done();
                return false;
            }
        }
    }

    host.notify_redraw();
    host.notify_done();
    true
}

/// Exhaustive backtracking search.
///
/// Orders pieces largest-first, then recursively exhausts the full
/// cell-by-rotation space per piece with proper undo. Complete: finds a
/// tiling whenever one exists. On total failure every piece is restored
/// to its exact pre-call state. Notifies completion only when solved.
pub fn backtracking_tiling<H: Host>(pieces: &mut [Piece], host: &mut H, pacer: &mut Pacer) -> bool {
    debug_assert!(
        pieces.iter().all(|piece| !piece.placed),
        "session pieces must start unplaced"
    );

    let snapshot = snapshot_states(pieces);
    let mut order: Vec<usize> = (0..pieces.len()).collect();
    order.sort_by_key(|&i| Reverse(pieces[i].cell_count()));

    if solve(0, &order, pieces, host, pacer) {
        host.notify_redraw();
        host.notify_done();
        true
    } else {
        // recursion already undid every placement; put positions back
        restore_states(pieces, &snapshot);
        host.notify_redraw();
        false
    }
}

fn solve<H: Host>(
    index: usize,
    order: &[usize],
    pieces: &mut [Piece],
    host: &mut H,
    pacer: &mut Pacer,
) -> bool {
    if index >= order.len() {
        return true;
    }

    let i = order[index];
    let rows = host.grid().rows;
    let cols = host.grid().cols;

    for _rotation in 0..4 {
        for row in 0..rows {
            for col in 0..cols {
                pacer.step(host);
                let (x, y) = host.grid().world_pos(row, col);
                if !can_place(host.grid(), &mut pieces[i], x, y) {
                    continue;
                }

                let prior_x = pieces[i].x;
                let prior_y = pieces[i].y;
                pieces[i].x = x;
                pieces[i].y = y;
                host.place(&pieces[i]);
                pieces[i].placed = true;
                host.notify_redraw();

                if solve(index + 1, order, pieces, host, pacer) {
                    return true;
                }

                // undo before moving the piece: remove reads its
                // placement-time position
                host.remove(&pieces[i]);
                pieces[i].placed = false;
                pieces[i].x = prior_x;
                pieces[i].y = prior_y;
                host.notify_redraw();
            }
        }
        pieces[i].rotate_right();
    }

    false
}

/// Randomized backtracking with single-step undo.
///
/// Shuffles the piece order once, then advances a cursor, scanning each
/// piece like the greedy strategy. When a piece has no legal spot, the
/// previously placed piece is removed and demoted one slot so the stuck
/// piece retries first with the freed cells. Failing on the very first
/// piece fails the run. This is a shallow policy, not a complete search;
/// after the shuffle it is fully deterministic, so revisiting a search
/// state proves it is looping and the run is declared stuck. Notifies
/// completion only when solved.
pub fn random_backtracking_tiling<H: Host, R: Rng>(
    pieces: &mut [Piece],
    host: &mut H,
    pacer: &mut Pacer,
    rng: &mut R,
) -> bool {
    debug_assert!(
        pieces.iter().all(|piece| !piece.placed),
        "session pieces must start unplaced"
    );

    let mut order: Vec<usize> = (0..pieces.len()).collect();
    order.shuffle(rng);

    let mut seen_states: FxHashSet<(usize, Vec<usize>, Vec<Cell>)> = FxHashSet::default();
    let mut cursor = 0;

    while cursor < order.len() {
        let state = (cursor, order.clone(), host.grid().cells().to_vec());
        if !seen_states.insert(state) {
            debug!("random backtracking: search state revisited, declaring stuck");
            return false;
        }

        if try_place_with_rotations(&mut pieces[order[cursor]], host, pacer) {
            host.notify_redraw();
            cursor += 1;
        } else if cursor == 0 {
            debug!(
                "random backtracking: piece {} fits nowhere on an empty scan",
                pieces[order[cursor]].id
            );
            return false;
        } else {
            let previous = order[cursor - 1];
            host.remove(&pieces[previous]);
            pieces[previous].placed = false;
            host.notify_redraw();
            // the stuck piece retries first; the blocker is demoted a slot
            order.swap(cursor - 1, cursor);
            cursor -= 1;
        }
    }

    host.notify_done();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::piece::{
        DOMINO, MONOMINO, TETROMINO_I, TETROMINO_L, TETROMINO_O, TROMINO,
    };
    use crate::session::GridHost;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Host that counts pacer yields, for predicate-evaluation bounds.
    struct CountingHost {
        inner: GridHost,
        yields: usize,
    }

    impl Host for CountingHost {
        fn grid(&self) -> &Grid {
            self.inner.grid()
        }
        fn place(&mut self, piece: &Piece) {
            self.inner.place(piece);
        }
        fn remove(&mut self, piece: &Piece) {
            self.inner.remove(piece);
        }
        fn yield_now(&mut self) {
            self.yields += 1;
        }
    }

    fn host(rows: usize, cols: usize) -> GridHost {
        GridHost::new(Grid::new(rows, cols, 30.0, 0.0, 0.0))
    }

    fn assert_occupancy_consistent(host: &GridHost, pieces: &[Piece], blocked: usize) {
        let placed_cells: usize = pieces
            .iter()
            .filter(|piece| piece.placed)
            .map(|piece| piece.cell_count())
            .sum();
        assert_eq!(host.grid.occupied_count(), placed_cells + blocked);
    }

    #[test]
    fn test_greedy_places_single_square_at_origin_cell() {
        let mut host = host(4, 4);
        let mut pieces = vec![Piece::new(0, TETROMINO_O, -100.0, -100.0, "red")];
        let mut pacer = Pacer::new(0);

        let placed = greedy_tiling(&mut pieces, &mut host, &mut pacer);

        assert_eq!(placed, 1);
        assert!(pieces[0].placed);
        assert_eq!(host.grid.base_cell(&pieces[0]), (0, 0));
        // rotation 0: the square still spans rows 0-1, cols 0-1
        assert_eq!(host.grid.cell_at(1, 1), Some(Cell::Piece(0)));
        assert_occupancy_consistent(&host, &pieces, 0);
    }

    #[test]
    fn test_greedy_skips_pre_occupied_cell() {
        let mut host = host(1, 3);
        host.grid.block(0, 0);
        let mut pieces = vec![Piece::new(0, MONOMINO, -50.0, -50.0, "red")];
        let mut pacer = Pacer::new(0);

        let placed = greedy_tiling(&mut pieces, &mut host, &mut pacer);

        assert_eq!(placed, 1);
        assert_eq!(host.grid.base_cell(&pieces[0]), (0, 1));
        assert_occupancy_consistent(&host, &pieces, 1);
    }

    #[test]
    fn test_greedy_tries_larger_pieces_first() {
        // on a single row the I tetromino only fits if it goes in before
        // the monomino claims a cell
        let mut host = host(1, 4);
        let mut pieces = vec![
            Piece::new(0, MONOMINO, -50.0, -50.0, "red"),
            Piece::new(1, TETROMINO_I, -50.0, -50.0, "blue"),
        ];
        let mut pacer = Pacer::new(0);

        let placed = greedy_tiling(&mut pieces, &mut host, &mut pacer);

        assert_eq!(placed, 1);
        assert!(pieces[1].placed);
        assert!(!pieces[0].placed);
        assert_occupancy_consistent(&host, &pieces, 0);
    }

    #[test]
    fn test_greedy_rotates_to_fit_a_column() {
        let mut host = host(4, 1);
        let mut pieces = vec![Piece::new(0, TROMINO, -50.0, -50.0, "red")];
        let mut pacer = Pacer::new(0);

        let placed = greedy_tiling(&mut pieces, &mut host, &mut pacer);

        assert_eq!(placed, 1);
        // the 1x3 bar only fits vertically, i.e. after one rotation
        assert_eq!(pieces[0].height(), 3);
        assert_eq!(pieces[0].width(), 1);
        assert_eq!(host.grid.base_cell(&pieces[0]), (0, 0));
    }

    #[test]
    fn test_random_places_everything_on_an_easy_grid() {
        let mut host = host(4, 4);
        let mut pieces = vec![
            Piece::new(0, MONOMINO, -50.0, -50.0, "red"),
            Piece::new(1, MONOMINO, -50.0, -50.0, "blue"),
            Piece::new(2, DOMINO, -50.0, -50.0, "green"),
        ];
        let mut pacer = Pacer::new(0);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(random_tiling(&mut pieces, &mut host, &mut pacer, &mut rng));
        assert!(pieces.iter().all(|piece| piece.placed));
        assert_occupancy_consistent(&host, &pieces, 0);
    }

    #[test]
    fn test_random_gives_up_within_the_retry_caps() {
        // a 1x4 bar never fits a 2x2 grid in any rotation, so every draw
        // fails: 100 draws per exhaustion, 100 exhaustions to give up
        let mut host = CountingHost {
            inner: host(2, 2),
            yields: 0,
        };
        let mut pieces = vec![Piece::new(0, TETROMINO_I, -50.0, -50.0, "red")];
        // budget 1 turns the yield count into a predicate-evaluation count
        let mut pacer = Pacer::new(1);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(!random_tiling(&mut pieces, &mut host, &mut pacer, &mut rng));
        assert!(!pieces[0].placed);
        assert_eq!(
            host.yields,
            RANDOM_ATTEMPTS_PER_PIECE * MAX_CONSECUTIVE_FAILS
        );
    }

    #[test]
    fn test_backtracking_tiles_two_l_pieces_exactly() {
        // two L tetrominoes tile a 2x4 rectangle (one of them rotated 180)
        let mut host = host(2, 4);
        let mut pieces = vec![
            Piece::new(0, TETROMINO_L, -50.0, -50.0, "red"),
            Piece::new(1, TETROMINO_L, -80.0, -20.0, "blue"),
        ];
        let mut pacer = Pacer::new(0);

        assert!(backtracking_tiling(&mut pieces, &mut host, &mut pacer));
        assert!(pieces.iter().all(|piece| piece.placed));
        assert_eq!(host.grid.occupied_count(), 8);
        assert_occupancy_consistent(&host, &pieces, 0);
    }

    #[test]
    fn test_backtracking_works_around_blocked_cells() {
        let mut host = host(2, 2);
        host.grid.block(0, 0);
        let mut pieces = vec![
            Piece::new(0, DOMINO, -50.0, -50.0, "red"),
            Piece::new(1, MONOMINO, -50.0, -50.0, "blue"),
        ];
        let mut pacer = Pacer::new(0);

        assert!(backtracking_tiling(&mut pieces, &mut host, &mut pacer));
        assert_eq!(host.grid.occupied_count(), 4);
        assert_occupancy_consistent(&host, &pieces, 1);
    }

    #[test]
    fn test_backtracking_failure_restores_the_exact_snapshot() {
        // two 2x2 squares cannot share a 2x2 grid
        let mut host = host(2, 2);
        let mut pieces = vec![
            Piece::new(0, TETROMINO_O, -60.0, -30.0, "red"),
            Piece::new(1, TETROMINO_O, -90.0, -10.0, "blue"),
        ];
        let snapshot = snapshot_states(&pieces);
        let mut pacer = Pacer::new(0);

        assert!(!backtracking_tiling(&mut pieces, &mut host, &mut pacer));
        assert_eq!(snapshot_states(&pieces), snapshot);
        assert_eq!(host.grid.occupied_count(), 0);
    }

    #[test]
    fn test_backtracking_fails_when_area_matches_but_no_tiling_exists() {
        // S tetromino + domino cover 6 cells like the 2x3 grid does, but
        // the leftover cells are never adjacent
        let mut host = host(2, 3);
        let mut pieces = vec![
            Piece::new(0, crate::piece::TETROMINO_S, -50.0, -50.0, "red"),
            Piece::new(1, DOMINO, -50.0, -50.0, "blue"),
        ];
        let snapshot = snapshot_states(&pieces);
        let mut pacer = Pacer::new(0);

        assert!(!backtracking_tiling(&mut pieces, &mut host, &mut pacer));
        assert_eq!(snapshot_states(&pieces), snapshot);
        assert_eq!(host.grid.occupied_count(), 0);
    }

    #[test]
    fn test_random_backtracking_solves_the_two_l_rectangle() {
        let mut host = host(2, 4);
        let mut pieces = vec![
            Piece::new(0, TETROMINO_L, -50.0, -50.0, "red"),
            Piece::new(1, TETROMINO_L, -50.0, -50.0, "blue"),
        ];
        let mut pacer = Pacer::new(0);
        let mut rng = StdRng::seed_from_u64(42);

        assert!(random_backtracking_tiling(
            &mut pieces,
            &mut host,
            &mut pacer,
            &mut rng
        ));
        assert_eq!(host.grid.occupied_count(), 8);
        assert_occupancy_consistent(&host, &pieces, 0);
    }

    #[test]
    fn test_random_backtracking_detects_a_cycle_and_stops() {
        // single-step undo ping-pongs the two squares forever; the
        // revisited state cuts the loop
        let mut host = host(2, 2);
        let mut pieces = vec![
            Piece::new(0, TETROMINO_O, -50.0, -50.0, "red"),
            Piece::new(1, TETROMINO_O, -50.0, -50.0, "blue"),
        ];
        let mut pacer = Pacer::new(0);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!random_backtracking_tiling(
            &mut pieces,
            &mut host,
            &mut pacer,
            &mut rng
        ));
        assert_occupancy_consistent(&host, &pieces, 0);
    }

    #[test]
    fn test_random_backtracking_undo_recovers_into_a_solution() {
        // a domino scanned first lands on (0, 0) and (0, 1), leaving no
        // room for the square; only removing it and demoting it behind
        // the square tiles the grid. Sweeping seeds covers both shuffle
        // orders, so the undo path is exercised, not just first-fit luck.
        for seed in 0..64 {
            let mut host = host(2, 3);
            let mut pieces = vec![
                Piece::new(0, TETROMINO_O, -50.0, -50.0, "red"),
                Piece::new(1, DOMINO, -50.0, -50.0, "blue"),
            ];
            let mut pacer = Pacer::new(0);
            let mut rng = StdRng::seed_from_u64(seed);

            assert!(
                random_backtracking_tiling(&mut pieces, &mut host, &mut pacer, &mut rng),
                "no tiling found with seed {seed}"
            );
            assert!(pieces.iter().all(|piece| piece.placed));
            assert_eq!(host.grid.occupied_count(), 6);
            assert_occupancy_consistent(&host, &pieces, 0);
        }
    }

    #[test]
    fn test_random_backtracking_fails_fast_on_an_unplaceable_first_piece() {
        let mut host = host(1, 1);
        let mut pieces = vec![Piece::new(0, DOMINO, -50.0, -50.0, "red")];
        let mut pacer = Pacer::new(0);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!random_backtracking_tiling(
            &mut pieces,
            &mut host,
            &mut pacer,
            &mut rng
        ));
        assert!(!pieces[0].placed);
    }
}
