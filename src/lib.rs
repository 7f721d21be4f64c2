//! # Sliding-Tile Puzzle Solver Library
//!
//! This library provides the state model for the N×N sliding-tile puzzle and
//! two search engines that find move sequences leading to the goal (tiles in
//! row-major order, blank in the bottom-right corner).
//!
//! It is used by three binaries:
//! - `solve`: reads a puzzle file, solves it and appends the moves to an output file.
//! - `play`: interactive play in the terminal, with solver-backed hints.
//! - `strategy_evaluator`: compares strategies and heuristics on seeded scrambles.
//!
//! ## Modules
//! - `engine`: `Grid` (immutable board state), `Move`, successor generation and scrambling.
//! - `heuristics`: Manhattan distance, linear conflicts and the misplaced row/column estimate.
//! - `solver`: `Puzzle`, `SolverConfig`, `SearchResult` and the best-first engine.
//! - `bidirectional`: breadth-first search from both ends that stops where the frontiers meet.
//! - `utils`: parsing puzzle files and writing solution files.

pub mod bidirectional;
pub mod engine;
pub mod heuristics;
pub mod solver;
pub mod utils;

pub use crate::engine::{Grid, Move};
pub use crate::heuristics::Heuristic;
pub use crate::solver::{Outcome, Puzzle, SearchResult, SolverConfig, Strategy};
