//! Core state model for the sliding-tile puzzle.
//!
//! This module defines the puzzle's fundamental components:
//! - `Move`: the four directions a tile can slide into the blank.
//! - `Grid`: an immutable N×N tile arrangement with one blank, supporting
//!   structural hashing, goal testing and successor generation.
//! - `GridError` / `InvalidMoveError`: construction and move failures.
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single puzzle move, named by the direction the tile next to the blank slides.
///
/// `Up` slides the tile below the blank upwards, so the blank itself moves one
/// row down. The other variants follow the same rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All moves in the order successors are generated.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Returns the move that undoes this one.
    ///
    /// # Examples
    /// ```
    /// use tile_solver::engine::Move;
    /// assert_eq!(Move::Up.reverse(), Move::Down);
    /// assert_eq!(Move::Left.reverse().reverse(), Move::Left);
    /// ```
    pub fn reverse(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    /// Offset applied to the blank's (row, column) when this move is made.
    fn blank_offset(self) -> (isize, isize) {
        match self {
            Move::Up => (1, 0),
            Move::Down => (-1, 0),
            Move::Left => (0, 1),
            Move::Right => (0, -1),
        }
    }

    /// The token written to solution files.
    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized move '{0}' (expected UP, DOWN, LEFT or RIGHT)")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Parses a move token, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Move::Up),
            "DOWN" => Ok(Move::Down),
            "LEFT" => Ok(Move::Left),
            "RIGHT" => Ok(Move::Right),
            _ => Err(ParseMoveError(s.trim().to_string())),
        }
    }
}

/// Reasons a cell layout cannot form a valid grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must have at least one row")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("expected {expected} cells, found {found}")]
    WrongCellCount { found: usize, expected: usize },
    #[error("value {value} is outside 0..={max}")]
    ValueOutOfRange { value: u32, max: u32 },
    #[error("value {0} appears more than once")]
    DuplicateValue(u16),
}

/// Returned by [`Grid::apply`] when the move would push the blank off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("move {attempted} is not legal with the blank at ({row}, {col})")]
pub struct InvalidMoveError {
    pub attempted: Move,
    pub row: usize,
    pub col: usize,
}

/// An immutable N×N tile arrangement.
///
/// Cells are stored flat in row-major order; `0` is the blank. Two grids are
/// equal, and hash equally, exactly when their cells are identical, so a `Grid`
/// is its own duplicate-detection key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Box<[u16]>,
    blank: usize,
}

impl Grid {
    /// Builds a grid from rows of tile values, validating the permutation.
    ///
    /// # Arguments
    /// * `rows`: `N` rows of `N` values each, containing every value in
    ///   `0..N*N` exactly once.
    ///
    /// # Returns
    /// * `Ok(Grid)` if the layout is a square permutation.
    /// * `Err(GridError)` describing the first problem found otherwise.
    ///
    /// # Examples
    /// ```
    /// use tile_solver::engine::Grid;
    /// let grid = Grid::from_rows(&[vec![1, 2], vec![3, 0]]).unwrap();
    /// assert!(grid.is_goal());
    /// assert!(Grid::from_rows(&[vec![1, 2], vec![2, 0]]).is_err());
    /// ```
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(GridError::RaggedRow {
                    row,
                    found: values.len(),
                    expected: size,
                });
            }
            cells.extend_from_slice(values);
        }
        Self::from_cells(size, &cells)
    }

    /// Builds a grid from `size * size` row-major values.
    pub fn from_cells(size: usize, values: &[u32]) -> Result<Self, GridError> {
        let area = Self::checked_area(size)?;
        if values.len() != area {
            return Err(GridError::WrongCellCount {
                found: values.len(),
                expected: area,
            });
        }
        let max = (area - 1) as u32;

        let mut seen = vec![false; area];
        let mut cells = Vec::with_capacity(area);
        let mut blank = 0;
        for (index, &value) in values.iter().enumerate() {
            if value > max {
                return Err(GridError::ValueOutOfRange { value, max });
            }
            let value = value as u16;
            if seen[value as usize] {
                return Err(GridError::DuplicateValue(value));
            }
            seen[value as usize] = true;
            if value == 0 {
                blank = index;
            }
            cells.push(value);
        }

        Ok(Grid {
            size,
            cells: cells.into_boxed_slice(),
            blank,
        })
    }

    /// Number of cells on a `size` board, if every tile value fits a `u16`.
    fn checked_area(size: usize) -> Result<usize, GridError> {
        if size == 0 {
            return Err(GridError::Empty);
        }
        let area = size
            .checked_mul(size)
            .ok_or(GridError::ValueOutOfRange {
                value: u32::MAX,
                max: u16::MAX as u32,
            })?;
        let max = area - 1;
        if max > u16::MAX as usize {
            return Err(GridError::ValueOutOfRange {
                value: u32::try_from(max).unwrap_or(u32::MAX),
                max: u16::MAX as u32,
            });
        }
        Ok(area)
    }

    /// The solved arrangement: `1..N*N-1` in row-major order, blank last.
    ///
    /// Fails with the same errors as [`Grid::from_cells`] when `size` is zero or
    /// the board is too large for its tile values.
    pub fn goal(size: usize) -> Result<Self, GridError> {
        Self::checked_area(size)?;
        Ok(Self::solved(size))
    }

    /// The goal for a board of this grid's size.
    pub fn canonical_goal(&self) -> Grid {
        Self::solved(self.size)
    }

    /// Callers have already validated `size`.
    fn solved(size: usize) -> Self {
        let area = size * size;
        let cells: Vec<u16> = (0..area).map(|i| ((i + 1) % area) as u16).collect();
        Grid {
            size,
            cells: cells.into_boxed_slice(),
            blank: area - 1,
        }
    }

    /// Creates a reproducible, solvable scramble by walking the blank randomly from the goal.
    ///
    /// The walk never immediately undoes its previous move; `steps` is an upper
    /// bound on the optimal solution length.
    ///
    /// # Arguments
    /// * `size`: board width and height.
    /// * `steps`: number of random moves to make.
    /// * `seed`: seed for the `SmallRng`; the same seed always gives the same grid.
    pub fn scrambled(size: usize, steps: usize, seed: u64) -> Result<Self, GridError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut grid = Grid::goal(size)?;
        let mut last = None;
        for _ in 0..steps {
            let options: Vec<Move> = grid.legal_moves(last).collect();
            let Some(&chosen) = options.choose(&mut rng) else {
                break;
            };
            grid = grid.slide(chosen);
            last = Some(chosen);
        }
        Ok(grid)
    }

    /// Board width (and height).
    pub fn size(&self) -> usize {
        self.size
    }

    /// The tile at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` is outside the board.
    pub fn get(&self, r: usize, c: usize) -> u16 {
        self.cells[r * self.size + c]
    }

    /// Row and column of the blank.
    pub fn blank_position(&self) -> (usize, usize) {
        (self.blank / self.size, self.blank % self.size)
    }

    /// Canonical duplicate-detection key: the row-major cell values.
    pub fn hash_key(&self) -> &[u16] {
        &self.cells
    }

    /// Iterates over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[u16]> {
        self.cells.chunks(self.size)
    }

    /// Goal row of `value`; the blank belongs in the last row.
    pub fn goal_row(&self, value: u16) -> usize {
        if value == 0 {
            self.size - 1
        } else {
            (value as usize - 1) / self.size
        }
    }

    /// Goal column of `value`; the blank belongs in the last column.
    pub fn goal_col(&self, value: u16) -> usize {
        if value == 0 {
            self.size - 1
        } else {
            (value as usize - 1) % self.size
        }
    }

    /// Checks whether every cell `(i, j)` holds `(i * N + j + 1) mod N²`.
    pub fn is_goal(&self) -> bool {
        let area = self.cells.len();
        self.cells
            .iter()
            .enumerate()
            .all(|(i, &value)| value as usize == (i + 1) % area)
    }

    fn is_legal(&self, mv: Move) -> bool {
        let (row, col) = self.blank_position();
        match mv {
            Move::Up => row + 1 < self.size,
            Move::Down => row > 0,
            Move::Left => col + 1 < self.size,
            Move::Right => col > 0,
        }
    }

    /// Legal moves from this grid, skipping the one that would undo `last`.
    ///
    /// Moves are yielded in `Move::ALL` order.
    pub fn legal_moves(&self, last: Option<Move>) -> impl Iterator<Item = Move> + '_ {
        let undo = last.map(Move::reverse);
        Move::ALL
            .into_iter()
            .filter(move |&mv| Some(mv) != undo && self.is_legal(mv))
    }

    /// Successor grids reachable in one move, paired with the move taken.
    pub fn successors(&self, last: Option<Move>) -> impl Iterator<Item = (Move, Grid)> + '_ {
        self.legal_moves(last).map(move |mv| (mv, self.slide(mv)))
    }

    /// Applies `mv`, returning the resulting grid.
    ///
    /// # Returns
    /// * `Ok(Grid)` with the blank swapped with the neighbour named by `mv`.
    /// * `Err(InvalidMoveError)` if no such neighbour exists.
    ///
    /// # Examples
    /// ```
    /// use tile_solver::engine::{Grid, Move};
    /// let grid = Grid::from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 0, 8]]).unwrap();
    /// assert!(grid.apply(Move::Left).unwrap().is_goal());
    /// assert!(grid.apply(Move::Up).is_err());
    /// ```
    pub fn apply(&self, mv: Move) -> Result<Grid, InvalidMoveError> {
        if !self.is_legal(mv) {
            let (row, col) = self.blank_position();
            return Err(InvalidMoveError {
                attempted: mv,
                row,
                col,
            });
        }
        Ok(self.slide(mv))
    }

    /// Applies a sequence of moves in order, stopping at the first illegal one.
    pub fn apply_all<'a, I>(&self, moves: I) -> Result<Grid, InvalidMoveError>
    where
        I: IntoIterator<Item = &'a Move>,
    {
        moves
            .into_iter()
            .try_fold(self.clone(), |grid, &mv| grid.apply(mv))
    }

    // Callers guarantee `mv` is legal.
    fn slide(&self, mv: Move) -> Grid {
        let (row, col) = self.blank_position();
        let (dr, dc) = mv.blank_offset();
        let target = (row as isize + dr) as usize * self.size + (col as isize + dc) as usize;

        let mut cells = self.cells.clone();
        cells.swap(self.blank, target);
        Grid {
            size: self.size,
            cells,
            blank: target,
        }
    }

    /// Counts tile pairs that appear in the wrong relative order (blank ignored).
    fn inversions(&self) -> usize {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value != 0)
            .map(|(i, &value)| {
                self.cells[i + 1..]
                    .iter()
                    .filter(|&&next| next != 0 && next < value)
                    .count()
            })
            .sum()
    }

    /// Inversion-parity test for reachability of the goal.
    ///
    /// Odd-sized boards are solvable when the inversion count is even. Even-sized
    /// boards are solvable when inversions plus the blank's row (from the top) is odd.
    pub fn is_solvable(&self) -> bool {
        let inversions = self.inversions();
        if self.size % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + self.blank_position().0) % 2 == 1
        }
    }
}

impl fmt::Display for Grid {
    /// One row per line, values right-aligned to the widest tile.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.cells.len() - 1).to_string().len();
        for row in self.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|&value| {
                    if value == 0 {
                        format!("{:>width$}", ".", width = width)
                    } else {
                        format!("{:>width$}", value, width = width)
                    }
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[u32]]) -> Grid {
        let rows: Vec<Vec<u32>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_goal_is_goal() {
        for size in 1..=5 {
            let goal = Grid::goal(size).unwrap();
            assert!(goal.is_goal(), "goal({}) should be a goal", size);
            assert_eq!(goal.blank_position(), (size - 1, size - 1));
        }
    }

    #[test]
    fn test_is_goal_rejects_blank_first() {
        // Same tiles in order but blank at the front is not the goal.
        let g = grid(&[&[0, 1, 2], &[3, 4, 5], &[6, 7, 8]]);
        assert!(!g.is_goal());
    }

    #[test]
    fn test_from_rows_finds_blank() {
        let g = grid(&[&[1, 2, 3], &[4, 0, 6], &[7, 5, 8]]);
        assert_eq!(g.size(), 3);
        assert_eq!(g.blank_position(), (1, 1));
        assert_eq!(g.get(2, 1), 5);
    }

    #[test]
    fn test_from_rows_rejects_bad_layouts() {
        assert_eq!(Grid::from_rows(&[]), Err(GridError::Empty));
        assert_eq!(
            Grid::from_rows(&[vec![1, 2, 3], vec![0]]),
            Err(GridError::RaggedRow {
                row: 0,
                found: 3,
                expected: 2
            })
        );
        assert_eq!(
            Grid::from_rows(&[vec![1, 2], vec![4, 0]]),
            Err(GridError::ValueOutOfRange { value: 4, max: 3 })
        );
        assert_eq!(
            Grid::from_rows(&[vec![1, 1], vec![3, 0]]),
            Err(GridError::DuplicateValue(1))
        );
    }

    #[test]
    fn test_goal_row_and_col() {
        let g = Grid::goal(4).unwrap();
        assert_eq!((g.goal_row(1), g.goal_col(1)), (0, 0));
        assert_eq!((g.goal_row(8), g.goal_col(8)), (1, 3));
        assert_eq!((g.goal_row(15), g.goal_col(15)), (3, 2));
        assert_eq!((g.goal_row(0), g.goal_col(0)), (3, 3));
    }

    #[test]
    fn test_legal_moves_respect_bounds() {
        // Blank in the bottom-right corner: only tiles above and to the left can slide in.
        let corner = Grid::goal(3).unwrap();
        let moves: Vec<Move> = corner.legal_moves(None).collect();
        assert_eq!(moves, vec![Move::Down, Move::Right]);

        let center = grid(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        assert_eq!(center.legal_moves(None).count(), 4);
    }

    #[test]
    fn test_legal_moves_skip_reversal() {
        let center = grid(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        for last in Move::ALL {
            let moves: Vec<Move> = center.legal_moves(Some(last)).collect();
            assert_eq!(moves.len(), 3);
            assert!(!moves.contains(&last.reverse()));
        }
    }

    #[test]
    fn test_successors_never_undo_along_random_walks() {
        for seed in 0..20 {
            let mut g = Grid::goal(4).unwrap();
            let mut last = None;
            for step in 0..30 {
                let successors: Vec<(Move, Grid)> = g.successors(last).collect();
                if let Some(prev) = last {
                    assert!(successors.iter().all(|(mv, _)| *mv != prev.reverse()));
                }
                let (mv, next) = successors[(seed + step) % successors.len()].clone();
                g = next;
                last = Some(mv);
            }
        }
    }

    #[test]
    fn test_apply_moves_tile_into_blank() {
        let g = grid(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        let up = g.apply(Move::Up).unwrap();
        assert_eq!(up.get(1, 1), 7);
        assert_eq!(up.blank_position(), (2, 1));

        let right = g.apply(Move::Right).unwrap();
        assert_eq!(right.get(1, 1), 4);
        assert_eq!(right.blank_position(), (1, 0));

        // Original is untouched.
        assert_eq!(g.blank_position(), (1, 1));
    }

    #[test]
    fn test_apply_illegal_move_is_error() {
        let g = Grid::goal(3).unwrap();
        assert_eq!(
            g.apply(Move::Up),
            Err(InvalidMoveError {
                attempted: Move::Up,
                row: 2,
                col: 2
            })
        );
        assert!(g.apply(Move::Left).is_err());
    }

    #[test]
    fn test_apply_then_reverse_round_trips() {
        let g = grid(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        for mv in Move::ALL {
            let back = g.apply(mv).unwrap().apply(mv.reverse()).unwrap();
            assert_eq!(back, g);
        }
    }

    #[test]
    fn test_hash_key_is_structural() {
        let a = grid(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        let b = a.apply(Move::Up).unwrap().apply(Move::Down).unwrap();
        assert_eq!(a.hash_key(), b.hash_key());
        assert_eq!(a, b);
        assert_ne!(a.hash_key(), Grid::goal(3).unwrap().hash_key());
    }

    #[test]
    fn test_scrambled_is_deterministic_and_solvable() {
        let a = Grid::scrambled(4, 60, 7).unwrap();
        let b = Grid::scrambled(4, 60, 7).unwrap();
        assert_eq!(a, b);
        assert!(a.is_solvable());
        assert_ne!(Grid::scrambled(4, 60, 8).unwrap(), a);
    }

    #[test]
    fn test_goal_rejects_sizes_without_a_valid_board() {
        assert_eq!(Grid::goal(0), Err(GridError::Empty));
        assert_eq!(Grid::scrambled(0, 10, 1), Err(GridError::Empty));
        assert_eq!(
            Grid::goal(257),
            Err(GridError::ValueOutOfRange {
                value: 257 * 257 - 1,
                max: u16::MAX as u32,
            })
        );
        assert!(Grid::scrambled(257, 0, 1).is_err());

        let largest = Grid::goal(256).unwrap();
        assert!(largest.is_goal());
        assert_eq!(largest.blank_position(), (255, 255));
        assert_eq!(largest.hash_key().iter().filter(|&&v| v == 0).count(), 1);
    }

    #[test]
    fn test_is_solvable_parity() {
        assert!(grid(&[&[1, 2, 3], &[4, 5, 6], &[7, 0, 8]]).is_solvable());
        assert!(!grid(&[&[1, 2, 3], &[4, 5, 6], &[8, 7, 0]]).is_solvable());
        assert!(Grid::goal(4).unwrap().is_solvable());
        assert!(!grid(&[&[2, 1], &[3, 0]]).is_solvable());
    }

    #[test]
    fn test_move_parse_and_display() {
        for mv in Move::ALL {
            assert_eq!(mv.to_string().parse::<Move>(), Ok(mv));
        }
        assert_eq!(" left ".parse::<Move>(), Ok(Move::Left));
        assert_eq!("Down".parse::<Move>(), Ok(Move::Down));
        assert!("sideways".parse::<Move>().is_err());
    }

    #[test]
    fn test_display_formatting() {
        let g = grid(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        assert_eq!(g.to_string(), "1 2 3\n4 . 5\n6 7 8\n");
        let wide = Grid::goal(4).unwrap().to_string();
        assert!(wide.starts_with(" 1  2  3  4\n"));
        assert!(wide.ends_with("13 14 15  .\n"));
    }
}
