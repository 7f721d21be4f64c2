use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tile_solver::heuristics::Heuristic;
use tile_solver::solver::{Outcome, Puzzle, SolverConfig, Strategy};
use tile_solver::utils::{append_solution, read_grid_file};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Solve a sliding-tile puzzle file", long_about = None)]
struct Args {
    /// Puzzle file: N lines of N space-separated tiles, 0 for the blank
    input_file: PathBuf,

    /// File the moves are appended to, one per line
    output_file: PathBuf,

    /// Search strategy (best-first or bidirectional)
    #[clap(short, long, default_value_t = Strategy::BestFirst)]
    strategy: Strategy,

    /// Heuristic for best-first search (manhattan, linear-conflict or row-col)
    #[clap(long, default_value_t = Heuristic::LinearConflict)]
    heuristic: Heuristic,

    /// Give up after this many seconds
    #[clap(short, long)]
    timeout: Option<f64>,

    /// Report odd-parity puzzles as unsolvable without searching
    #[clap(long)]
    parity_check: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = Args::parse();

    let start = read_grid_file(&args.input_file)
        .with_context(|| format!("Failed to load puzzle from {}", args.input_file.display()))?;
    info!(
        "Loaded {}x{} puzzle from {}",
        start.size(),
        start.size(),
        args.input_file.display()
    );

    let mut config = SolverConfig::default()
        .with_strategy(args.strategy)
        .with_heuristic(args.heuristic)
        .with_parity_check(args.parity_check);
    if let Some(seconds) = args.timeout {
        let timeout = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("Invalid timeout: {} seconds", seconds))?;
        config = config.with_timeout(timeout);
    }

    let result = Puzzle::from_start(start).solve(&config);
    match &result.outcome {
        Outcome::Solved(moves) => info!(
            "Solved in {} moves ({} nodes, {:?})",
            moves.len(),
            result.nodes.unwrap_or_default(),
            result.elapsed.unwrap_or_default()
        ),
        Outcome::Unsolvable => info!(
            "Puzzle is unsolvable ({} nodes explored)",
            result.nodes.unwrap_or_default()
        ),
        Outcome::TimedOut => warn!("Search timed out; node count and time are undefined"),
    }

    append_solution(&args.output_file, &result.outcome)
        .with_context(|| format!("Failed to write {}", args.output_file.display()))?;
    Ok(())
}
