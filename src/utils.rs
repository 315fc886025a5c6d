use crate::engine::{Board, Coord, EXIT_MARKER, MAX_DIMENSION, MAX_PIECES, PRIMARY_PIECE};
use crate::error::PuzzleError;
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::Path;

/// A line holding nothing but the exit marker, used above or below the board
/// for top and bottom exits.
fn is_exit_line(line: &str) -> bool {
    let mut chars = line.trim().chars();
    chars.next() == Some(EXIT_MARKER) && chars.next().is_none()
}

fn exit_column(line: &str) -> usize {
    line.chars().take_while(|&ch| ch != EXIT_MARKER).count()
}

/// Where an exit marker was found while reading the layout.
#[derive(Clone, Copy)]
enum ExitSide {
    Top(usize),
    Bottom(usize),
    Left(usize),
    Right(usize),
}

/// Parses board lines, with the exit marker drawn outside the border, into a
/// validated `Board`.
///
/// `expected` carries the dimensions announced by a file header; when it is
/// `None` they are inferred from the lines.
fn parse_layout(lines: &[&str], expected: Option<(usize, usize)>) -> Result<Board, PuzzleError> {
    let mut lines: Vec<&str> = lines.iter().map(|l| l.trim_end()).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let mut exits = Vec::new();
    let mut body: &[&str] = &lines;
    if body.len() > 1 && is_exit_line(body[0]) {
        exits.push(ExitSide::Top(exit_column(body[0])));
        body = &body[1..];
    }
    if body.len() > 1 && is_exit_line(body[body.len() - 1]) {
        exits.push(ExitSide::Bottom(exit_column(body[body.len() - 1])));
        body = &body[..body.len() - 1];
    }

    if let Some((rows, _)) = expected {
        if body.len() != rows {
            return Err(PuzzleError::Header(format!(
                "expected {} board rows, found {}",
                rows,
                body.len()
            )));
        }
    }

    let left_exit = body.iter().any(|l| l.starts_with(EXIT_MARKER));
    let mut rows: Vec<Vec<char>> = Vec::with_capacity(body.len());
    for (r, line) in body.iter().enumerate() {
        let mut chars: Vec<char> = line.chars().collect();
        if left_exit {
            if chars.first() == Some(&EXIT_MARKER) {
                exits.push(ExitSide::Left(r));
                chars.remove(0);
            } else if chars.first() == Some(&' ') {
                chars.remove(0);
            }
        }
        if chars.last() == Some(&EXIT_MARKER) {
            exits.push(ExitSide::Right(r));
            chars.pop();
        }
        rows.push(chars);
    }

    let cols = match expected {
        Some((_, cols)) => cols,
        None => rows.first().map_or(0, Vec::len),
    };
    for (r, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(PuzzleError::RowLength {
                row: r + 1,
                expected: cols,
                found: row.len(),
            });
        }
    }

    let row_count = rows.len();
    let exit = match exits.as_slice() {
        [] => return Err(PuzzleError::MissingExit),
        [side] => match *side {
            ExitSide::Top(col) => Coord::new(-1, col as i32),
            ExitSide::Bottom(col) => Coord::new(row_count as i32, col as i32),
            ExitSide::Left(row) => Coord::new(row as i32, -1),
            ExitSide::Right(row) => Coord::new(row as i32, cols as i32),
        },
        _ => return Err(PuzzleError::MultipleExits),
    };

    let grid: Vec<char> = rows.into_iter().flatten().collect();
    Board::new(row_count, cols, grid, exit)
}

/// Parses an array of string slices, one per board row, into a `Board`.
///
/// The exit marker `K` is written outside the board:
/// - right exit: at the end of the primary piece's row,
/// - left exit: at the start of the row; other rows may carry one leading space,
/// - top / bottom exit: on its own line above or below the board, indented to its column.
///
/// # Errors
/// Returns a `PuzzleError` if the rows have different widths, there is not
/// exactly one exit, or the resulting board fails validation.
///
/// # Examples
/// ```
/// use rush_hour_solver::utils::puzzle_from_str_array;
/// use rush_hour_solver::engine::Coord;
///
/// let board = puzzle_from_str_array(&[
///     "..A",
///     "PPA",
///     "...",
///     "  K",
/// ]);
/// // A vertical primary is required for a bottom exit.
/// assert!(board.is_err());
///
/// let board = puzzle_from_str_array(&[
///     "..A",
///     "PPAK",
///     "...",
/// ]).unwrap();
/// assert_eq!(board.exit(), Coord::new(1, 3));
/// assert_eq!(board.cell(0, 2), 'A');
/// ```
pub fn puzzle_from_str_array(s: &[&str]) -> Result<Board, PuzzleError> {
    parse_layout(s, None)
}

/// Parses a puzzle file body.
///
/// The format is a `rows cols` line, a line with the number of pieces other
/// than the primary piece, then the board lines as accepted by
/// [`puzzle_from_str_array`]. A piece count that disagrees with the board is
/// logged and otherwise ignored.
pub fn parse_puzzle(text: &str) -> Result<Board, PuzzleError> {
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

    let header = lines
        .next()
        .ok_or_else(|| PuzzleError::Header("missing dimensions line".to_string()))?;
    let dims: Vec<&str> = header.split_whitespace().collect();
    let &[rows, cols] = dims.as_slice() else {
        return Err(PuzzleError::Header(format!(
            "first line must contain two integers (rows cols), found '{}'",
            header
        )));
    };
    let parse_dim = |value: &str| {
        value
            .parse::<usize>()
            .map_err(|e| PuzzleError::Header(format!("invalid dimension '{}': {}", value, e)))
    };
    let (rows, cols) = (parse_dim(rows)?, parse_dim(cols)?);
    if rows == 0 || cols == 0 || rows > MAX_DIMENSION || cols > MAX_DIMENSION {
        return Err(PuzzleError::Dimensions { rows, cols });
    }

    let count_line = lines
        .next()
        .ok_or_else(|| PuzzleError::Header("missing piece count line".to_string()))?;
    let declared = count_line.trim().parse::<usize>().map_err(|e| {
        PuzzleError::Header(format!("invalid piece count '{}': {}", count_line.trim(), e))
    })?;
    if declared > MAX_PIECES {
        return Err(PuzzleError::PieceCount(declared));
    }

    let body: Vec<&str> = lines.collect();
    let board = parse_layout(&body, Some((rows, cols)))?;

    let actual = board.pieces().keys().filter(|&&id| id != PRIMARY_PIECE).count();
    if actual != declared {
        warn!(
            "header declares {} pieces but the board holds {}; using the board",
            declared, actual
        );
    }
    Ok(board)
}

/// Reads and parses a puzzle file. See [`parse_puzzle`] for the format.
pub fn load_puzzle(path: &Path) -> Result<Board, PuzzleError> {
    let content = fs::read_to_string(path)?;
    parse_puzzle(&content)
}

/// Random walk of up to `steps` slides from `board`, never taking the exit.
///
/// Used to derive benchmark instances from a known puzzle; the same seed
/// always yields the same board.
pub fn scramble<R: Rng + ?Sized>(board: &Board, steps: usize, rng: &mut R) -> Board {
    let mut current = board.clone();
    for _ in 0..steps {
        let options: Vec<Board> = current
            .successors()
            .into_iter()
            .filter(|(_, next)| !next.has_exited())
            .map(|(_, next)| next)
            .collect();
        match options.choose(rng) {
            Some(next) => current = next.clone(),
            None => break,
        }
    }
    current
}
