use anyhow::Context;
use clap::Parser;
use log::warn;
use std::collections::HashMap;
use std::time::Duration;
use tile_solver::engine::Grid;
use tile_solver::heuristics::Heuristic;
use tile_solver::solver::{Outcome, Puzzle, SolverConfig, Strategy};

const START_SEED: u64 = 0;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compare search strategies on seeded scrambles", long_about = None)]
struct Args {
    /// Board width and height
    #[clap(short, long, default_value_t = 3)]
    size: usize,

    /// Number of random moves used to scramble each board
    #[clap(long, default_value_t = 60)]
    scramble: usize,

    /// Number of boards to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: usize,

    /// Per-solve timeout in seconds
    #[clap(short, long, default_value_t = 10.0)]
    timeout: f64,
}

#[derive(Default)]
struct Tally {
    solved: usize,
    timed_out: usize,
    moves: usize,
    nodes: usize,
    elapsed: Duration,
}

fn configurations() -> Vec<(String, SolverConfig)> {
    let mut configs: Vec<(String, SolverConfig)> = Heuristic::ALL
        .iter()
        .map(|&h| {
            (
                format!("{}/{}", Strategy::BestFirst, h),
                SolverConfig::default().with_heuristic(h),
            )
        })
        .collect();
    configs.push((
        Strategy::Bidirectional.to_string(),
        SolverConfig::default().with_strategy(Strategy::Bidirectional),
    ));
    configs
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let timeout = Duration::try_from_secs_f64(args.timeout)
        .with_context(|| format!("Invalid timeout: {} seconds", args.timeout))?;

    let configs = configurations();
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    println!(
        "Evaluating {} boards ({}x{}, {} scramble moves)...",
        args.boards, args.size, args.size, args.scramble
    );

    for board_idx in 0..args.boards {
        let seed = START_SEED + board_idx as u64;
        let start = Grid::scrambled(args.size.max(2), args.scramble, seed)
            .with_context(|| format!("Cannot build a {}x{} board", args.size, args.size))?;
        let puzzle = Puzzle::from_start(start);
        println!("\nBoard {} (Seed: {})\n{}", board_idx, seed, puzzle.start());

        for (name, config) in &configs {
            let config = config.clone().with_timeout(timeout);
            let result = puzzle.solve(&config);
            let tally = tallies.entry(name.clone()).or_default();
            match &result.outcome {
                Outcome::Solved(moves) => {
                    tally.solved += 1;
                    tally.moves += moves.len();
                    tally.nodes += result.nodes.unwrap_or_default();
                    tally.elapsed += result.elapsed.unwrap_or_default();
                    println!(
                        "  {:<28} moves: {:<4} nodes: {:<10} time: {:?}",
                        name,
                        moves.len(),
                        result.nodes.unwrap_or_default(),
                        result.elapsed.unwrap_or_default()
                    );
                }
                Outcome::TimedOut => {
                    tally.timed_out += 1;
                    println!("  {:<28} timed out", name);
                }
                Outcome::Unsolvable => {
                    warn!("Scrambled board {} reported unsolvable by {}", board_idx, name);
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!(
        "{:<28} {:>7} {:>9} {:>10} {:>14} {:>12}",
        "Configuration", "Solved", "Timeouts", "Avg moves", "Avg nodes", "Avg time"
    );
    for (name, _) in &configs {
        let Some(tally) = tallies.get(name) else {
            continue;
        };
        if tally.solved == 0 {
            println!("{:<28} {:>7} {:>9}", name, 0, tally.timed_out);
            continue;
        }
        let solved = tally.solved as f64;
        println!(
            "{:<28} {:>7} {:>9} {:>10.2} {:>14.1} {:>12?}",
            name,
            tally.solved,
            tally.timed_out,
            tally.moves as f64 / solved,
            tally.nodes as f64 / solved,
            tally.elapsed / tally.solved as u32
        );
    }
    Ok(())
}
