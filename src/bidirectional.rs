//! Bidirectional breadth-first search.
//!
//! One FIFO queue holds nodes from both ends of the search, tagged with the
//! direction they grow in, so forward and backward expansions interleave in
//! discovery order. The search stops as soon as a newly generated state has
//! already been seen from the other side.
use crate::engine::{Grid, Move};
use crate::solver::{deadline_passed, Outcome, SearchResult};
use log::trace;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    /// Grows from the start towards the goal.
    Forward,
    /// Grows from the goal towards the start.
    Backward,
}

#[derive(Debug)]
struct Node {
    grid: Grid,
    /// Moves from this node's root (start or goal) to `grid`.
    moves: Vec<Move>,
    direction: Direction,
}

/// Visited states per direction, each mapped to the moves that first reached it.
#[derive(Default)]
struct VisitedMaps {
    forward: FxHashMap<Grid, Vec<Move>>,
    backward: FxHashMap<Grid, Vec<Move>>,
}

impl VisitedMaps {
    fn own(&self, direction: Direction) -> &FxHashMap<Grid, Vec<Move>> {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    fn opposite(&self, direction: Direction) -> &FxHashMap<Grid, Vec<Move>> {
        match direction {
            Direction::Forward => &self.backward,
            Direction::Backward => &self.forward,
        }
    }

    fn record(&mut self, direction: Direction, grid: Grid, moves: Vec<Move>) {
        let map = match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        };
        map.entry(grid).or_insert(moves);
    }

    fn len(&self) -> usize {
        self.forward.len() + self.backward.len()
    }
}

/// Joins a forward path and a backward path that end on the same state.
///
/// The backward half is walked from the meeting point back to the goal, so its
/// moves are taken in reverse order and each one is reversed.
fn splice(forward: &[Move], backward: &[Move]) -> Vec<Move> {
    let mut path = Vec::with_capacity(forward.len() + backward.len());
    path.extend_from_slice(forward);
    path.extend(backward.iter().rev().map(|mv| mv.reverse()));
    path
}

/// Searches from `start` and `goal` at once until the frontiers meet.
///
/// The caller handles the `start == goal` case; the timeout is checked once per
/// dequeued node.
pub(crate) fn search(
    start: &Grid,
    goal: &Grid,
    timeout: Option<Duration>,
    started: Instant,
) -> SearchResult {
    let mut visited = VisitedMaps::default();
    visited.record(Direction::Forward, start.clone(), Vec::new());
    visited.record(Direction::Backward, goal.clone(), Vec::new());

    let mut queue = VecDeque::from([
        Node {
            grid: start.clone(),
            moves: Vec::new(),
            direction: Direction::Forward,
        },
        Node {
            grid: goal.clone(),
            moves: Vec::new(),
            direction: Direction::Backward,
        },
    ]);

    while let Some(node) = queue.pop_front() {
        if deadline_passed(started, timeout) {
            trace!(
                "Bidirectional search timed out with {} forward and {} backward states",
                visited.forward.len(),
                visited.backward.len()
            );
            return SearchResult::timed_out();
        }

        for (mv, next) in node.grid.successors(node.moves.last().copied()) {
            if visited.own(node.direction).contains_key(&next) {
                continue;
            }

            let mut moves = Vec::with_capacity(node.moves.len() + 1);
            moves.extend_from_slice(&node.moves);
            moves.push(mv);

            if let Some(other) = visited.opposite(node.direction).get(&next) {
                let path = match node.direction {
                    Direction::Forward => splice(&moves, other),
                    Direction::Backward => splice(other, &moves),
                };
                trace!(
                    "Frontiers met on a {}-move path ({:?} side reached it in {})",
                    path.len(),
                    node.direction,
                    moves.len()
                );
                return SearchResult::finished(Outcome::Solved(path), visited.len(), started);
            }

            visited.record(node.direction, next.clone(), moves.clone());
            queue.push_back(Node {
                grid: next,
                moves,
                direction: node.direction,
            });
        }
    }

    SearchResult::finished(Outcome::Unsolvable, visited.len(), started)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::Heuristic;
    use crate::solver::{Puzzle, SolverConfig, Strategy};

    fn grid(rows: &[&[u32]]) -> Grid {
        let rows: Vec<Vec<u32>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).unwrap()
    }

    fn bidirectional() -> SolverConfig {
        SolverConfig::default().with_strategy(Strategy::Bidirectional)
    }

    #[test]
    fn test_splice_reverses_backward_half() {
        let forward = [Move::Up, Move::Left];
        let backward = [Move::Right, Move::Down];
        assert_eq!(
            splice(&forward, &backward),
            vec![Move::Up, Move::Left, Move::Up, Move::Left]
        );
        assert_eq!(splice(&[], &[Move::Left]), vec![Move::Right]);
    }

    #[test_log::test]
    fn test_one_move_solution() {
        let start = grid(&[&[1, 2, 3], &[4, 5, 6], &[7, 0, 8]]);
        let result = Puzzle::from_start(start).solve(&bidirectional());
        assert_eq!(result.outcome, Outcome::Solved(vec![Move::Left]));
        // Start and goal seeded; the forward DOWN successor is recorded before LEFT meets the goal.
        assert_eq!(result.nodes, Some(3));
    }

    #[test_log::test]
    fn test_already_solved() {
        let result = Puzzle::from_start(Grid::goal(3).unwrap()).solve(&bidirectional());
        assert_eq!(result.outcome, Outcome::Solved(Vec::new()));
    }

    #[test_log::test]
    fn test_paths_reach_goal_and_are_no_shorter_than_optimal() {
        for seed in 0..8 {
            let start = Grid::scrambled(3, 30, seed).unwrap();
            let puzzle = Puzzle::from_start(start.clone());

            let meet = puzzle.solve(&bidirectional());
            let end = start.apply_all(meet.moves()).unwrap();
            assert!(end.is_goal(), "seed {} ends at\n{}", seed, end);

            let optimal =
                puzzle.solve(&SolverConfig::default().with_heuristic(Heuristic::LinearConflict));
            assert!(meet.moves().len() >= optimal.moves().len());
            assert_eq!(meet.is_solved(), optimal.is_solved());
        }
    }

    #[test_log::test]
    fn test_hard_instance() {
        let start = grid(&[&[8, 6, 7], &[2, 5, 4], &[3, 0, 1]]);
        let result = Puzzle::from_start(start.clone()).solve(&bidirectional());
        let end = start.apply_all(result.moves()).unwrap();
        assert!(end.is_goal());
        assert!(result.moves().len() >= 31);
    }

    #[test_log::test]
    fn test_unsolvable_2x2_empties_queue() {
        let start = grid(&[&[2, 1], &[3, 0]]);
        let result = Puzzle::from_start(start).solve(&bidirectional());
        assert_eq!(result.outcome, Outcome::Unsolvable);
        // Each half of the 2x2 state space has 12 states.
        assert_eq!(result.nodes, Some(24));
    }

    #[test_log::test]
    fn test_agrees_with_best_first_on_unsolvable_3x3() {
        let start = grid(&[&[1, 2, 3], &[4, 5, 6], &[8, 7, 0]]);
        let result = Puzzle::from_start(start).solve(&bidirectional());
        assert_eq!(result.outcome, Outcome::Unsolvable);
        assert_eq!(result.nodes, Some(181_440 * 2));
    }

    #[test_log::test]
    fn test_timeout() {
        let start = Grid::scrambled(5, 300, 9).unwrap();
        let timeout = Duration::from_millis(10);
        let config = bidirectional().with_timeout(timeout);
        let clock = Instant::now();
        let result = Puzzle::from_start(start).solve(&config);
        assert_eq!(result.outcome, Outcome::TimedOut);
        assert_eq!(result.nodes, None);
        assert_eq!(result.elapsed, None);
        assert!(clock.elapsed() < timeout + Duration::from_secs(2));
    }

    #[test_log::test]
    fn test_deterministic() {
        let puzzle = Puzzle::from_start(Grid::scrambled(3, 40, 5).unwrap());
        let first = puzzle.solve(&bidirectional());
        let second = puzzle.solve(&bidirectional());
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.nodes, second.nodes);
    }
}
