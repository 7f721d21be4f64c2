use crate::engine::Grid;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Cost-to-goal estimates the best-first solver can be configured with.
///
/// All variants are admissible for the canonical goal (blank bottom-right).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// Sum of Manhattan distances of every tile.
    Manhattan,
    /// Manhattan distance plus two moves per linear conflict.
    #[default]
    LinearConflict,
    /// Tiles outside their goal row plus tiles outside their goal column.
    MisplacedRowCol,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::Manhattan,
        Heuristic::LinearConflict,
        Heuristic::MisplacedRowCol,
    ];

    /// Evaluates this heuristic on `grid`.
    ///
    /// # Examples
    /// ```
    /// use tile_solver::engine::Grid;
    /// use tile_solver::heuristics::Heuristic;
    /// let grid = Grid::from_rows(&[vec![2, 1, 3], vec![4, 5, 6], vec![7, 8, 0]]).unwrap();
    /// assert_eq!(Heuristic::Manhattan.evaluate(&grid), 2);
    /// assert_eq!(Heuristic::LinearConflict.evaluate(&grid), 4);
    /// ```
    pub fn evaluate(self, grid: &Grid) -> u32 {
        match self {
            Heuristic::Manhattan => manhattan_distance(grid),
            Heuristic::LinearConflict => manhattan_distance(grid) + 2 * linear_conflicts(grid),
            Heuristic::MisplacedRowCol => misplaced_row_col(grid),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::LinearConflict => "linear-conflict",
            Heuristic::MisplacedRowCol => "row-col",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown heuristic '{0}' (expected manhattan, linear-conflict or row-col)")]
pub struct ParseHeuristicError(pub String);

impl FromStr for Heuristic {
    type Err = ParseHeuristicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "linear-conflict" | "linear_conflict" | "lc" => Ok(Heuristic::LinearConflict),
            "row-col" | "row_col" | "misplaced-row-col" => Ok(Heuristic::MisplacedRowCol),
            other => Err(ParseHeuristicError(other.to_string())),
        }
    }
}

/// Sums `|row - goal_row| + |col - goal_col|` over every non-blank tile.
///
/// # Arguments
/// * `grid`: the arrangement to evaluate.
///
/// # Returns
/// The total Manhattan distance as `u32`; `0` exactly when `grid` is the goal.
pub fn manhattan_distance(grid: &Grid) -> u32 {
    let size = grid.size();
    let mut distance = 0;
    for r in 0..size {
        for c in 0..size {
            let value = grid.get(r, c);
            if value == 0 {
                continue;
            }
            distance += r.abs_diff(grid.goal_row(value)) + c.abs_diff(grid.goal_col(value));
        }
    }
    distance as u32
}

/// Counts tiles outside their goal row plus tiles outside their goal column.
///
/// Each misplaced coordinate needs at least one move, so this never
/// overestimates.
pub fn misplaced_row_col(grid: &Grid) -> u32 {
    let size = grid.size();
    let mut count = 0;
    for r in 0..size {
        for c in 0..size {
            let value = grid.get(r, c);
            if value == 0 {
                continue;
            }
            if grid.goal_row(value) != r {
                count += 1;
            }
            if grid.goal_col(value) != c {
                count += 1;
            }
        }
    }
    count
}

/// Orientation of the line being scanned for conflicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Line {
    Row(usize),
    Column(usize),
}

impl Line {
    /// Cell coordinates of position `k` along this line.
    fn cell(self, k: usize) -> (usize, usize) {
        match self {
            Line::Row(r) => (r, k),
            Line::Column(c) => (k, c),
        }
    }

    /// If `value` belongs on this line, returns its goal position along it.
    fn goal_position(self, grid: &Grid, value: u16) -> Option<usize> {
        if value == 0 {
            return None;
        }
        match self {
            Line::Row(r) if grid.goal_row(value) == r => Some(grid.goal_col(value)),
            Line::Column(c) if grid.goal_col(value) == c => Some(grid.goal_row(value)),
            _ => None,
        }
    }
}

/// Resolves the conflicts on one line by greedy max-degree removal.
///
/// Two tiles conflict when both already sit on their goal line but in inverted
/// order. The tile with the most unresolved conflicts (the first one along the
/// line on ties) is lifted out repeatedly until none remain; each lift counts
/// as one conflict.
fn line_conflicts(grid: &Grid, line: Line) -> u32 {
    let size = grid.size();
    let targets: Vec<Option<usize>> = (0..size)
        .map(|k| {
            let (r, c) = line.cell(k);
            line.goal_position(grid, grid.get(r, c))
        })
        .collect();

    let in_conflict = |a: usize, b: usize| -> bool {
        match (targets[a], targets[b]) {
            (Some(ta), Some(tb)) => (a < b && ta > tb) || (a > b && ta < tb),
            _ => false,
        }
    };

    let mut degree: Vec<u32> = (0..size)
        .map(|a| (0..size).filter(|&b| in_conflict(a, b)).count() as u32)
        .collect();
    let mut removed = vec![false; size];
    let mut conflicts = 0;

    loop {
        let mut worst = None;
        let mut worst_degree = 0;
        for (k, &d) in degree.iter().enumerate() {
            if d > worst_degree {
                worst_degree = d;
                worst = Some(k);
            }
        }
        let Some(lifted) = worst else {
            break;
        };

        degree[lifted] = 0;
        removed[lifted] = true;
        for k in 0..size {
            if !removed[k] && in_conflict(lifted, k) {
                degree[k] -= 1;
            }
        }
        conflicts += 1;
    }
    conflicts
}

/// Total linear conflicts over every row and then every column.
///
/// Each conflict forces a tile to step off its goal line and back, so callers
/// add `2 * linear_conflicts(grid)` to the Manhattan distance.
pub fn linear_conflicts(grid: &Grid) -> u32 {
    let size = grid.size();
    let rows: u32 = (0..size).map(|r| line_conflicts(grid, Line::Row(r))).sum();
    let columns: u32 = (0..size)
        .map(|c| line_conflicts(grid, Line::Column(c)))
        .sum();
    rows + columns
}
