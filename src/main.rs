//! Polyomino Tiler
//!
//! Tiles a rectangular grid with polyomino pieces using one of four
//! placement strategies and prints the resulting occupancy grid.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tiler::piece::{shape_by_name, Piece, SHAPE_CATALOG};
use tiler::{solver, Grid, GridHost, Pacer};

/// Display colors cycled across pieces; cosmetic only.
const PALETTE: &[&str] = &[
    "red", "blue", "green", "yellow", "magenta", "cyan", "orange",
];

/// Tiles a grid with polyomino pieces and prints the result.
#[derive(Parser)]
#[command(name = "tiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level filter (overridden by RUST_LOG).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a placement strategy and print the tiled grid.
    Solve(SolveArgs),
    /// List the built-in shape catalog.
    Shapes,
}

#[derive(Args)]
struct SolveArgs {
    /// Placement strategy to run.
    #[arg(long, value_enum, default_value_t = StrategyKind::Backtracking)]
    strategy: StrategyKind,

    /// Grid height in cells.
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Grid width in cells.
    #[arg(long, default_value_t = 10)]
    cols: usize,

    /// Cell size in world units.
    #[arg(long, default_value_t = 30.0)]
    cell_size: f32,

    /// Comma-separated shape names (see `tiler shapes`).
    #[arg(long, default_value = "l,t,s,o,i,domino")]
    pieces: String,

    /// RNG seed for the random strategies; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Predicate evaluations between cooperative yields; 0 disables.
    #[arg(long, default_value_t = 500)]
    frame_budget: u32,
}

impl Default for SolveArgs {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Backtracking,
            rows: 10,
            cols: 10,
            cell_size: 30.0,
            pieces: "l,t,s,o,i,domino".to_string(),
            seed: None,
            frame_budget: 500,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    /// Largest pieces first, first fit, no backtracking.
    Greedy,
    /// Uniform random cell draws with retry budgets.
    Random,
    /// Complete recursive search with undo.
    Backtracking,
    /// Shuffled order with single-step undo.
    RandomBacktracking,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .log_to_stderr()
        .start()?;

    match cli.command {
        Some(Command::Solve(args)) => run_solve(&args),
        Some(Command::Shapes) => {
            run_shapes();
            Ok(())
        }
        None => run_solve(&SolveArgs::default()),
    }
}

/// Builds the session pieces from a comma-separated shape list.
///
/// Pieces start off-grid so every strategy begins from an unplaced state.
fn build_pieces(names: &str, cell_size: f32) -> Result<Vec<Piece>> {
    let start = -2.0 * cell_size;
    names
        .split(',')
        .enumerate()
        .map(|(id, name)| match shape_by_name(name) {
            Some(shape) => Ok(Piece::new(
                id,
                shape,
                start,
                start,
                PALETTE[id % PALETTE.len()],
            )),
            None => bail!("unknown shape '{}' (see `tiler shapes`)", name.trim()),
        })
        .collect()
}

fn run_solve(args: &SolveArgs) -> Result<()> {
    if args.rows == 0 || args.cols == 0 {
        bail!("grid must have at least one row and one column");
    }
    if args.cell_size <= 0.0 {
        bail!("cell size must be positive");
    }

    let mut pieces = build_pieces(&args.pieces, args.cell_size)?;
    let mut host = GridHost::new(Grid::new(args.rows, args.cols, args.cell_size, 0.0, 0.0));
    let mut pacer = Pacer::new(args.frame_budget);

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let start = std::time::Instant::now();
    let solved = match args.strategy {
        StrategyKind::Greedy => {
            let placed = solver::greedy_tiling(&mut pieces, &mut host, &mut pacer);
            placed == pieces.len()
        }
        StrategyKind::Random => {
            info!("seed {seed}");
            solver::random_tiling(&mut pieces, &mut host, &mut pacer, &mut rng)
        }
        StrategyKind::Backtracking => solver::backtracking_tiling(&mut pieces, &mut host, &mut pacer),
        StrategyKind::RandomBacktracking => {
            info!("seed {seed}");
            solver::random_backtracking_tiling(&mut pieces, &mut host, &mut pacer, &mut rng)
        }
    };
    info!("strategy finished in {:.2?}", start.elapsed());

    print!("{}", host.grid.render());
    let placed = pieces.iter().filter(|piece| piece.placed).count();
    if solved {
        println!("Tiled {placed}/{} pieces", pieces.len());
    } else {
        println!("No complete tiling ({placed}/{} pieces placed)", pieces.len());
    }
    Ok(())
}

/// Prints every catalog shape as a small 0/1 matrix.
fn run_shapes() {
    for &(name, shape) in SHAPE_CATALOG {
        println!("{name}");
        for row in shape {
            let line: String = row
                .iter()
                .map(|&cell| if cell != 0 { '#' } else { '.' })
                .collect();
            println!("  {line}");
        }
        println!();
    }
}
