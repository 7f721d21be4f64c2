use crate::bidirectional;
use crate::engine::{Grid, Move};
use crate::heuristics::Heuristic;
use log::{debug, trace};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Search strategy used by [`Puzzle::solve`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Best-first search on path length plus heuristic; optimal without a timeout.
    #[default]
    BestFirst,
    /// Uninformed breadth-first search from both ends, meeting in the middle.
    Bidirectional,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::BestFirst, Strategy::Bidirectional];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::BestFirst => "best-first",
            Strategy::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}' (expected best-first or bidirectional)")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-first" | "best_first" | "astar" | "a*" => Ok(Strategy::BestFirst),
            "bidirectional" | "bidi" => Ok(Strategy::Bidirectional),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

/// Knobs for a single solve.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tile_solver::heuristics::Heuristic;
/// use tile_solver::solver::{SolverConfig, Strategy};
///
/// let config = SolverConfig::default()
///     .with_heuristic(Heuristic::Manhattan)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.strategy, Strategy::BestFirst);
/// assert_eq!(config.timeout, Some(Duration::from_secs(5)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolverConfig {
    pub strategy: Strategy,
    /// Only consulted by [`Strategy::BestFirst`].
    pub heuristic: Heuristic,
    /// `None` searches until the outcome is known.
    pub timeout: Option<Duration>,
    /// Report odd-parity starts as unsolvable without searching.
    pub parity_check: bool,
}

impl SolverConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_parity_check(mut self, enabled: bool) -> Self {
        self.parity_check = enabled;
        self
    }
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Moves leading from the start to the goal; empty if the start was solved.
    Solved(Vec<Move>),
    /// Every reachable state was explored without finding the goal.
    Unsolvable,
    /// The configured timeout elapsed first.
    TimedOut,
}

/// Outcome plus diagnostics of one `solve` call.
///
/// `nodes` and `elapsed` are `None` after a timeout, where they are undefined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub outcome: Outcome,
    /// Best-first: nodes pushed onto the frontier. Bidirectional: size of both visited maps.
    pub nodes: Option<usize>,
    pub elapsed: Option<Duration>,
}

impl SearchResult {
    pub(crate) fn finished(outcome: Outcome, nodes: usize, started: Instant) -> Self {
        SearchResult {
            outcome,
            nodes: Some(nodes),
            elapsed: Some(started.elapsed()),
        }
    }

    pub(crate) fn timed_out() -> Self {
        SearchResult {
            outcome: Outcome::TimedOut,
            nodes: None,
            elapsed: None,
        }
    }

    /// The solution path, or an empty slice for any other outcome.
    pub fn moves(&self) -> &[Move] {
        match &self.outcome {
            Outcome::Solved(moves) => moves,
            Outcome::Unsolvable | Outcome::TimedOut => &[],
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, Outcome::Solved(_))
    }
}

/// Reasons a start/goal pair cannot be searched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("start is {start}x{start} but goal is {goal}x{goal}")]
    SizeMismatch { start: usize, goal: usize },
    #[error("goal must have tiles in row-major order with the blank last")]
    NonCanonicalGoal,
}

/// A start grid paired with the goal it should reach.
///
/// # Examples
/// ```
/// use tile_solver::engine::{Grid, Move};
/// use tile_solver::solver::{Outcome, Puzzle, SolverConfig};
///
/// let start = Grid::from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 0, 8]]).unwrap();
/// let puzzle = Puzzle::new(start, Grid::goal(3).unwrap()).unwrap();
/// let result = puzzle.solve(&SolverConfig::default());
/// assert_eq!(result.outcome, Outcome::Solved(vec![Move::Left]));
/// ```
#[derive(Clone, Debug)]
pub struct Puzzle {
    start: Grid,
    goal: Grid,
}

impl Puzzle {
    /// Pairs `start` with `goal`, which must be the canonical goal of the same size.
    pub fn new(start: Grid, goal: Grid) -> Result<Self, PuzzleError> {
        if start.size() != goal.size() {
            return Err(PuzzleError::SizeMismatch {
                start: start.size(),
                goal: goal.size(),
            });
        }
        if !goal.is_goal() {
            return Err(PuzzleError::NonCanonicalGoal);
        }
        Ok(Puzzle { start, goal })
    }

    /// Pairs `start` with the canonical goal of its size.
    pub fn from_start(start: Grid) -> Self {
        let goal = start.canonical_goal();
        Puzzle { start, goal }
    }

    pub fn start(&self) -> &Grid {
        &self.start
    }

    pub fn goal(&self) -> &Grid {
        &self.goal
    }

    /// Runs the configured search from the start grid.
    ///
    /// Repeated calls with the same configuration and no timeout return the
    /// same moves.
    pub fn solve(&self, config: &SolverConfig) -> SearchResult {
        let started = Instant::now();
        debug!(
            "Solving {}x{} puzzle with {} (heuristic {}, timeout {:?})",
            self.start.size(),
            self.start.size(),
            config.strategy,
            config.heuristic,
            config.timeout
        );

        if self.start.is_goal() {
            return SearchResult::finished(Outcome::Solved(Vec::new()), 0, started);
        }
        if config.parity_check && !self.start.is_solvable() {
            debug!("Start fails the parity check; skipping search");
            return SearchResult::finished(Outcome::Unsolvable, 0, started);
        }

        let result = match config.strategy {
            Strategy::BestFirst => {
                best_first(&self.start, config.heuristic, config.timeout, started)
            }
            Strategy::Bidirectional => {
                bidirectional::search(&self.start, &self.goal, config.timeout, started)
            }
        };
        debug!(
            "{} finished: {} after {} moves, nodes {:?}, elapsed {:?}",
            config.strategy,
            outcome_label(&result.outcome),
            result.moves().len(),
            result.nodes,
            result.elapsed
        );
        result
    }
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Solved(_) => "solved",
        Outcome::Unsolvable => "unsolvable",
        Outcome::TimedOut => "timed out",
    }
}

pub(crate) fn deadline_passed(started: Instant, timeout: Option<Duration>) -> bool {
    timeout.is_some_and(|limit| started.elapsed() > limit)
}

/// A discovered state with the path that reached it.
#[derive(Debug)]
struct SearchNode {
    grid: Grid,
    moves: Vec<Move>,
    evaluation: u32,
}

impl SearchNode {
    fn new(grid: Grid, moves: Vec<Move>, heuristic: Heuristic) -> Self {
        let evaluation = moves.len() as u32 + heuristic.evaluate(&grid);
        SearchNode {
            grid,
            moves,
            evaluation,
        }
    }

    fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }
}

/// Frontier entry; `sequence` is the push order and breaks evaluation ties.
#[derive(Debug)]
struct FrontierEntry {
    sequence: u64,
    node: SearchNode,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    // Reversed so the max-heap pops the lowest evaluation, then the earliest push.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .node
            .evaluation
            .cmp(&self.node.evaluation)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority frontier with insertion-order tie-breaking.
#[derive(Default)]
struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    pushed: u64,
}

impl Frontier {
    fn push(&mut self, node: SearchNode) {
        self.heap.push(FrontierEntry {
            sequence: self.pushed,
            node,
        });
        self.pushed += 1;
    }

    fn pop(&mut self) -> Option<SearchNode> {
        self.heap.pop().map(|entry| entry.node)
    }
}

/// Best-first search from `start` towards the canonical goal.
///
/// States are marked visited when popped; a popped state that was already
/// visited is a stale duplicate and is skipped. Successors already visited are
/// never pushed. With a consistent heuristic the first path popped for the
/// goal is optimal.
pub(crate) fn best_first(
    start: &Grid,
    heuristic: Heuristic,
    timeout: Option<Duration>,
    started: Instant,
) -> SearchResult {
    let mut frontier = Frontier::default();
    let mut visited: FxHashSet<Grid> = FxHashSet::default();
    let mut nodes = 0usize;
    frontier.push(SearchNode::new(start.clone(), Vec::new(), heuristic));

    loop {
        if deadline_passed(started, timeout) {
            trace!(
                "Best-first timed out with {} visited and {} queued",
                visited.len(),
                frontier.heap.len()
            );
            return SearchResult::timed_out();
        }

        let Some(node) = frontier.pop() else {
            return SearchResult::finished(Outcome::Unsolvable, nodes, started);
        };
        if !visited.insert(node.grid.clone()) {
            continue;
        }
        if node.grid.is_goal() {
            return SearchResult::finished(Outcome::Solved(node.moves), nodes, started);
        }

        for (mv, next) in node.grid.successors(node.last_move()) {
            if visited.contains(&next) {
                continue;
            }
            let mut moves = Vec::with_capacity(node.moves.len() + 1);
            moves.extend_from_slice(&node.moves);
            moves.push(mv);
            frontier.push(SearchNode::new(next, moves, heuristic));
            nodes += 1;
        }
    }
}
