use crate::engine::{Grid, GridError};
use crate::solver::Outcome;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Token written when the search proves the puzzle has no solution.
pub const UNSOLVABLE_TOKEN: &str = "UNSOLVABLE";

/// Why a puzzle description could not be turned into a [`Grid`].
#[derive(Debug, Error)]
pub enum InputFormatError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: '{token}' is not a tile number")]
    BadToken {
        line: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Parses a puzzle description into a `Grid`.
///
/// Each non-empty line is one row of whitespace-separated integers; the
/// number of rows determines `N`, and every row must hold exactly `N` values
/// covering `0..N*N` once (0 is the blank).
///
/// # Arguments
/// * `input`: the full text of the puzzle file.
///
/// # Returns
/// * `Ok(Grid)` if the text describes a valid square permutation.
/// * `Err(InputFormatError)` naming the first offending line, token or value.
///
/// # Examples
/// ```
/// use tile_solver::utils::parse_grid;
///
/// let grid = parse_grid("1 2 3\n4 5 6\n7 0 8\n").unwrap();
/// assert_eq!(grid.size(), 3);
/// assert_eq!(grid.blank_position(), (2, 1));
///
/// assert!(parse_grid("1 2\n3 9\n").is_err());
/// assert!(parse_grid("1 2 x\n").is_err());
/// ```
pub fn parse_grid(input: &str) -> Result<Grid, InputFormatError> {
    let mut rows: Vec<Vec<u32>> = Vec::new();
    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|source| InputFormatError::BadToken {
                        line: index + 1,
                        token: token.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<u32>, _>>()?;
        rows.push(row);
    }
    Ok(Grid::from_rows(&rows)?)
}

/// Reads and parses the puzzle file at `path`.
pub fn read_grid_file(path: &Path) -> Result<Grid, InputFormatError> {
    let content = fs::read_to_string(path).map_err(|source| InputFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_grid(&content)
}

/// Renders an outcome in the solution-file format.
///
/// Solved outcomes produce one move token per line, unsolvable puzzles the
/// single line `UNSOLVABLE`, and timeouts nothing at all.
pub fn format_solution(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Solved(moves) => moves.iter().map(|mv| format!("{}\n", mv)).collect(),
        Outcome::Unsolvable => format!("{}\n", UNSOLVABLE_TOKEN),
        Outcome::TimedOut => String::new(),
    }
}

/// Appends the formatted outcome to `path`, creating the file if needed.
pub fn append_solution(path: &Path, outcome: &Outcome) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_solution(outcome).as_bytes())?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Move;
    use std::env;
    use std::process;

    fn scratch_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("tile_solver_{}_{}", process::id(), name))
    }

    #[test]
    fn test_parse_grid_valid() {
        let grid = parse_grid("1 2 3\n4 5 6\n7 8 0\n").unwrap();
        assert!(grid.is_goal());
    }

    #[test]
    fn test_parse_grid_tolerates_extra_whitespace() {
        let grid = parse_grid("  1   2 \n\n3  0\n\n").unwrap();
        assert_eq!(grid.size(), 2);
        assert!(grid.is_goal());
    }

    #[test]
    fn test_parse_grid_rejects_out_of_range_value() {
        let err = parse_grid("1 2 3\n4 5 6\n7 9 0\n").unwrap_err();
        assert!(matches!(
            err,
            InputFormatError::Grid(GridError::ValueOutOfRange { value: 9, max: 8 })
        ));
    }

    #[test]
    fn test_parse_grid_rejects_non_numbers() {
        let err = parse_grid("1 2\n3 -1\n").unwrap_err();
        match &err {
            InputFormatError::BadToken {
                line,
                token,
                source,
            } => {
                assert_eq!(*line, 2);
                assert_eq!(token, "-1");
                assert_eq!(err.to_string(), "line 2: '-1' is not a tile number");
                assert!(!err.to_string().contains(&source.to_string()));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_grid_rejects_ragged_rows() {
        let err = parse_grid("1 2 3\n4 5\n6 7 0\n").unwrap_err();
        assert!(err.to_string().contains("row 1 has 2 cells"));
    }

    #[test]
    fn test_parse_grid_rejects_duplicates_and_empty_input() {
        assert!(matches!(
            parse_grid("1 1\n2 0\n"),
            Err(InputFormatError::Grid(GridError::DuplicateValue(1)))
        ));
        assert!(matches!(
            parse_grid("\n\n"),
            Err(InputFormatError::Grid(GridError::Empty))
        ));
    }

    #[test]
    fn test_read_grid_file_missing() {
        let err = read_grid_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, InputFormatError::Io { .. }));
        assert_eq!(err.to_string(), "failed to read /definitely/not/here.txt");
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert!(!err.to_string().contains(&cause));
    }

    #[test]
    fn test_format_solution() {
        let solved = Outcome::Solved(vec![Move::Left, Move::Up]);
        assert_eq!(format_solution(&solved), "LEFT\nUP\n");
        assert_eq!(format_solution(&Outcome::Solved(Vec::new())), "");
        assert_eq!(format_solution(&Outcome::Unsolvable), "UNSOLVABLE\n");
        assert_eq!(format_solution(&Outcome::TimedOut), "");
    }

    #[test]
    fn test_append_solution_appends() {
        let path = scratch_path("append.txt");
        let _ = fs::remove_file(&path);

        append_solution(&path, &Outcome::Solved(vec![Move::Down])).unwrap();
        append_solution(&path, &Outcome::Unsolvable).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "DOWN\nUNSOLVABLE\n");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_grid_file_round_trip() {
        let path = scratch_path("input.txt");
        fs::write(&path, "1 2 3\n4 5 6\n7 0 8\n").unwrap();
        let grid = read_grid_file(&path).unwrap();
        assert_eq!(grid.apply(Move::Left).map(|g| g.is_goal()), Ok(true));
        fs::remove_file(&path).unwrap();
    }
}
