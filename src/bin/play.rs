use anyhow::Context;
use clap::Parser;
use log::debug;
use std::io::{self, Write};
use std::time::Duration;
use tile_solver::engine::{Grid, Move};
use tile_solver::solver::{Outcome, Puzzle, SolverConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play the sliding-tile puzzle in the terminal", long_about = None)]
struct Args {
    /// Board width and height
    #[clap(short, long, default_value_t = 3)]
    size: usize,

    /// Number of random moves used to scramble the board
    #[clap(long, default_value_t = 40)]
    scramble: usize,

    /// Seed for the scramble
    #[clap(long, default_value_t = 514514)]
    seed: u64,
}

/// Asks the solver for the next move from `grid`, giving up after a few seconds.
fn hint(grid: &Grid) -> Option<Move> {
    let config = SolverConfig::default().with_timeout(Duration::from_secs(5));
    let result = Puzzle::from_start(grid.clone()).solve(&config);
    debug!("Hint search: {:?} nodes, {:?}", result.nodes, result.elapsed);
    match result.outcome {
        Outcome::Solved(moves) => moves.first().copied(),
        Outcome::Unsolvable | Outcome::TimedOut => None,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut grid = Grid::scrambled(args.size.max(2), args.scramble, args.seed)
        .with_context(|| format!("Cannot build a {}x{} board", args.size, args.size))?;
    let mut history: Vec<Move> = Vec::new();
    println!("Welcome to the sliding-tile puzzle!");

    loop {
        println!("---------------------");
        println!("Moves: {}", history.len());
        println!("{}", grid);

        if grid.is_goal() {
            println!("🎉 SOLVED in {} moves! 🎉", history.len());
            break;
        }

        print!("Enter a move (up/down/left/right), 'u' to undo, 'h' for a hint, 'q' to quit: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => match history.pop() {
                Some(last) => match grid.apply(last.reverse()) {
                    Ok(previous) => {
                        grid = previous;
                        println!("Move undone.");
                    }
                    Err(err) => println!("Cannot undo: {}", err),
                },
                None => println!("Nothing to undo."),
            },
            "h" => match hint(&grid) {
                Some(mv) => println!("Hint: try {}", mv),
                None => println!("No hint available."),
            },
            token => match token.parse::<Move>() {
                Ok(mv) => match grid.apply(mv) {
                    Ok(next) => {
                        grid = next;
                        history.push(mv);
                    }
                    Err(err) => println!("Invalid move: {}", err),
                },
                Err(err) => println!("{}", err),
            },
        }
    }
    Ok(())
}
