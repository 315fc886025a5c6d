//! Core board model for Rush Hour puzzles.
//!
//! This module defines the puzzle's fundamental components:
//! - `Coord`: A signed grid coordinate, so exits just outside the border are representable.
//! - `Direction` / `Orientation`: The four slide directions and the two piece axes.
//! - `Move`: The label of a single slide (piece, direction, distance).
//! - `Board`: A grid snapshot with its piece map and exit, including successor
//!   generation, the goal test and move attribution.
use crate::error::PuzzleError;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier reserved for the piece that has to reach the exit.
pub const PRIMARY_PIECE: char = 'P';
/// Marker used in puzzle text for the exit cell outside the board.
pub const EXIT_MARKER: char = 'K';
/// Marker for an empty cell.
pub const EMPTY: char = '.';
/// Largest accepted number of rows or columns.
pub const MAX_DIMENSION: usize = 20;
/// Largest accepted number of pieces besides the primary piece.
pub const MAX_PIECES: usize = 50;

/// A (row, column) position. Signed, because the exit lives at `-1` or at
/// `rows`/`cols`, one step outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Coord { row, col }
    }

    /// Returns the coordinate `steps` cells away in `direction`.
    pub fn offset(self, direction: Direction, steps: i32) -> Coord {
        let (dr, dc) = direction.delta();
        Coord {
            row: self.row + dr * steps,
            col: self.col + dc * steps,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Axis along which a piece slides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One of the four cardinal slide directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Row and column delta of a single step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Lower-case name used in move labels.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// The two directions along an axis, negative direction first.
    pub fn along(orientation: Orientation) -> [Direction; 2] {
        match orientation {
            Orientation::Horizontal => [Direction::Left, Direction::Right],
            Orientation::Vertical => [Direction::Up, Direction::Down],
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Label of a single slide: which piece moved, where, and how far.
///
/// Displayed as `A-down`, or `A-down x2` for multi-cell slides.
///
/// # Examples
///
/// ```
/// use rush_hour_solver::engine::{Direction, Move};
/// let mv = Move { piece: 'A', direction: Direction::Down, distance: 2 };
/// assert_eq!(mv.to_string(), "A-down x2");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub piece: char,
    pub direction: Direction,
    pub distance: usize,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.piece, self.direction)?;
        if self.distance > 1 {
            write!(f, " x{}", self.distance)?;
        }
        Ok(())
    }
}

/// Orientation of a footprint, read from its first two cells.
/// Returns `None` for footprints shorter than two cells.
fn footprint_orientation(cells: &[Coord]) -> Option<Orientation> {
    match cells {
        [first, second, ..] if first.row == second.row => Some(Orientation::Horizontal),
        [_, _, ..] => Some(Orientation::Vertical),
        _ => None,
    }
}

/// The footprint cell furthest along `direction`.
fn leading_cell(cells: &[Coord], direction: Direction) -> Option<Coord> {
    let cells = cells.iter().copied();
    match direction {
        Direction::Up => cells.min_by_key(|c| c.row),
        Direction::Down => cells.max_by_key(|c| c.row),
        Direction::Left => cells.min_by_key(|c| c.col),
        Direction::Right => cells.max_by_key(|c| c.col),
    }
}

/// Checks that a footprint is a single contiguous horizontal or vertical segment.
fn is_straight_segment(cells: &[Coord]) -> bool {
    let mut sorted = cells.to_vec();
    sorted.sort_unstable();
    let horizontal = sorted
        .windows(2)
        .all(|w| w[1].row == w[0].row && w[1].col == w[0].col + 1);
    let vertical = sorted
        .windows(2)
        .all(|w| w[1].col == w[0].col && w[1].row == w[0].row + 1);
    horizontal || vertical
}

/// A snapshot of the puzzle: the grid, the pieces on it and the exit.
///
/// Boards are never mutated once built; every successor is an independent
/// copy. Two boards are equal (and hash equally) iff their grids hold the
/// same markers cell for cell. The piece map and exit are derived metadata
/// and take no part in identity.
#[derive(Clone, Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    grid: Vec<char>,
    pieces: BTreeMap<char, Vec<Coord>>,
    exit: Coord,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.grid == other.grid
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.cols.hash(state);
        self.grid.hash(state);
    }
}

impl Board {
    /// Builds and validates a board from a row-major grid and an exit position.
    ///
    /// The piece map is derived by scanning the grid, so each footprint is
    /// listed in row-major order.
    ///
    /// # Errors
    /// Returns a `PuzzleError` when the dimensions are out of range, the grid
    /// contains an exit marker, the primary piece is missing, a piece is not a
    /// straight segment of at least two cells, there are too many pieces, or
    /// the exit is not on the border and aligned with the primary piece.
    pub fn new(
        rows: usize,
        cols: usize,
        grid: Vec<char>,
        exit: Coord,
    ) -> Result<Self, PuzzleError> {
        if rows == 0 || cols == 0 || rows > MAX_DIMENSION || cols > MAX_DIMENSION {
            return Err(PuzzleError::Dimensions { rows, cols });
        }
        if grid.len() != rows * cols {
            return Err(PuzzleError::RowLength {
                row: grid.len() / cols,
                expected: rows * cols,
                found: grid.len(),
            });
        }

        let mut pieces: BTreeMap<char, Vec<Coord>> = BTreeMap::new();
        for (idx, &marker) in grid.iter().enumerate() {
            let (r, c) = (idx / cols, idx % cols);
            if marker == EXIT_MARKER {
                return Err(PuzzleError::ExitInsideBoard { row: r, col: c });
            }
            if marker != EMPTY {
                pieces
                    .entry(marker)
                    .or_default()
                    .push(Coord::new(r as i32, c as i32));
            }
        }

        let others = pieces.keys().filter(|&&id| id != PRIMARY_PIECE).count();
        if others > MAX_PIECES {
            return Err(PuzzleError::PieceCount(others));
        }
        for (&id, cells) in &pieces {
            if cells.len() < 2 {
                return Err(PuzzleError::PieceTooShort(id));
            }
            if !is_straight_segment(cells) {
                return Err(PuzzleError::PieceShape(id));
            }
        }

        let board = Board {
            rows,
            cols,
            grid,
            pieces,
            exit,
        };
        board.validate_exit()?;
        Ok(board)
    }

    fn validate_exit(&self) -> Result<(), PuzzleError> {
        let (rows, cols) = (self.rows as i32, self.cols as i32);
        let Coord { row, col } = self.exit;
        let on_border = ((col == cols || col == -1) && (0..rows).contains(&row))
            || ((row == rows || row == -1) && (0..cols).contains(&col));
        if !on_border {
            return Err(PuzzleError::ExitNotOnBorder { row, col });
        }

        let cells = self.primary_cells().ok_or(PuzzleError::MissingPrimary)?;
        let orientation =
            footprint_orientation(cells).ok_or(PuzzleError::PieceTooShort(PRIMARY_PIECE))?;
        let axis_exit = match orientation {
            Orientation::Horizontal => col == cols || col == -1,
            Orientation::Vertical => row == rows || row == -1,
        };
        if !axis_exit || !self.exit_aligned_with(cells, orientation) {
            return Err(PuzzleError::ExitMisaligned);
        }
        Ok(())
    }

    /// Number of rows in the grid.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the grid.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the marker at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r >= rows` or `c >= cols`.
    pub fn cell(&self, r: usize, c: usize) -> char {
        assert!(r < self.rows && c < self.cols, "cell ({}, {}) out of bounds", r, c);
        self.grid[r * self.cols + c]
    }

    /// The grid as one string per row.
    pub fn grid_rows(&self) -> Vec<String> {
        self.grid
            .chunks(self.cols)
            .map(|row| row.iter().collect())
            .collect()
    }

    /// The exit position, just outside the grid.
    pub fn exit(&self) -> Coord {
        self.exit
    }

    /// Piece identifiers mapped to their footprints.
    pub fn pieces(&self) -> &BTreeMap<char, Vec<Coord>> {
        &self.pieces
    }

    /// Footprint of the primary piece, or `None` once it has left the board.
    pub fn primary_cells(&self) -> Option<&[Coord]> {
        self.pieces.get(&PRIMARY_PIECE).map(Vec::as_slice)
    }

    /// `true` once the primary piece has been driven out through the exit.
    pub fn has_exited(&self) -> bool {
        !self.pieces.contains_key(&PRIMARY_PIECE)
    }

    /// Axis of the given piece, if it is on the board.
    pub fn orientation_of(&self, piece: char) -> Option<Orientation> {
        self.pieces.get(&piece).and_then(|cells| footprint_orientation(cells))
    }

    fn in_bounds(&self, pos: Coord) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows
            && (pos.col as usize) < self.cols
    }

    /// Marker at `pos`, or `None` when `pos` is off the grid.
    fn marker_at(&self, pos: Coord) -> Option<char> {
        if self.in_bounds(pos) {
            Some(self.grid[pos.row as usize * self.cols + pos.col as usize])
        } else {
            None
        }
    }

    fn set_marker(&mut self, pos: Coord, marker: char) {
        let idx = pos.row as usize * self.cols + pos.col as usize;
        self.grid[idx] = marker;
    }

    fn exit_aligned_with(&self, cells: &[Coord], orientation: Orientation) -> bool {
        match orientation {
            Orientation::Horizontal => cells[0].row == self.exit.row,
            Orientation::Vertical => cells[0].col == self.exit.col,
        }
    }

    /// Direction the primary piece has to travel to reach the exit, plus the
    /// in-grid cells lying strictly between its leading cell and the exit.
    ///
    /// Returns `None` when the primary piece has exited or is not aligned
    /// with the exit. An empty lane means the piece is flush with the exit.
    pub fn exit_lane(&self) -> Option<(Direction, Vec<Coord>)> {
        let cells = self.primary_cells()?;
        let orientation = footprint_orientation(cells)?;
        if !self.exit_aligned_with(cells, orientation) {
            return None;
        }
        let [negative, positive] = Direction::along(orientation);
        let direction = if leading_cell(cells, positive)? < self.exit {
            positive
        } else if self.exit < leading_cell(cells, negative)? {
            negative
        } else {
            return None;
        };
        let lead = leading_cell(cells, direction)?;

        let mut lane = Vec::new();
        let mut step = 1;
        loop {
            let pos = lead.offset(direction, step);
            if pos == self.exit || !self.in_bounds(pos) {
                break;
            }
            lane.push(pos);
            step += 1;
        }
        Some((direction, lane))
    }

    /// Goal test: the primary piece has exited, or it can slide along its own
    /// axis to the exit through empty cells only. A piece already flush with
    /// the exit edge is a goal.
    pub fn is_goal(&self) -> bool {
        if self.has_exited() {
            return true;
        }
        match self.exit_lane() {
            Some((_, lane)) => lane.iter().all(|&pos| self.marker_at(pos) == Some(EMPTY)),
            None => false,
        }
    }

    /// Generates every board reachable with a single slide, each paired with
    /// its move label.
    ///
    /// Pieces are visited in identifier order; for each piece the negative
    /// direction (left/up) is tried before the positive one, and shorter
    /// slides before longer ones. A slide of the primary piece that reaches
    /// the exit produces a board with the primary piece removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rush_hour_solver::utils::puzzle_from_str_array;
    /// let board = puzzle_from_str_array(&[
    ///     "...",
    ///     "PP.K",
    /// ]).unwrap();
    /// let labels: Vec<String> = board.successors().iter().map(|(mv, _)| mv.to_string()).collect();
    /// assert_eq!(labels, vec!["P-right", "P-right x2"]);
    /// ```
    pub fn successors(&self) -> Vec<(Move, Board)> {
        let mut next = Vec::new();
        for (&piece, cells) in &self.pieces {
            let Some(orientation) = footprint_orientation(cells) else {
                continue;
            };
            for direction in Direction::along(orientation) {
                self.push_slides(piece, cells, orientation, direction, &mut next);
            }
        }
        next
    }

    fn push_slides(
        &self,
        piece: char,
        cells: &[Coord],
        orientation: Orientation,
        direction: Direction,
        out: &mut Vec<(Move, Board)>,
    ) {
        let Some(lead) = leading_cell(cells, direction) else {
            return;
        };
        let can_exit = piece == PRIMARY_PIECE && self.exit_aligned_with(cells, orientation);

        let mut step = 1;
        loop {
            let target = lead.offset(direction, step as i32);
            let mv = Move {
                piece,
                direction,
                distance: step,
            };
            if can_exit && target == self.exit {
                out.push((mv, self.without_piece(piece)));
                break;
            }
            if self.marker_at(target) != Some(EMPTY) {
                break;
            }
            out.push((mv, self.with_piece_shifted(piece, cells, direction, step)));
            step += 1;
        }
    }

    fn with_piece_shifted(
        &self,
        piece: char,
        cells: &[Coord],
        direction: Direction,
        steps: usize,
    ) -> Board {
        let mut next = self.clone();
        for &pos in cells {
            next.set_marker(pos, EMPTY);
        }
        let moved: Vec<Coord> = cells
            .iter()
            .map(|&pos| pos.offset(direction, steps as i32))
            .collect();
        for &pos in &moved {
            next.set_marker(pos, piece);
        }
        next.pieces.insert(piece, moved);
        next
    }

    fn without_piece(&self, piece: char) -> Board {
        let mut next = self.clone();
        if let Some(cells) = next.pieces.remove(&piece) {
            for pos in cells {
                next.set_marker(pos, EMPTY);
            }
        }
        next
    }

    /// Attributes the difference between `self` and `next` to a single move.
    ///
    /// Recognises ordinary slides (one piece shifted along its axis) and the
    /// primary piece leaving through the exit. Legality of the path is not
    /// checked here; only that exactly one piece accounts for the change.
    ///
    /// Returns `None` when no single move explains the difference.
    pub fn infer_move(&self, next: &Board) -> Option<Move> {
        if self.rows != next.rows || self.cols != next.cols || self.exit != next.exit {
            return None;
        }
        if next.pieces.keys().any(|id| !self.pieces.contains_key(id)) {
            return None;
        }

        let mut changed = self
            .pieces
            .iter()
            .filter(|&(id, cells)| next.pieces.get(id) != Some(cells));
        let (&piece, cells) = changed.next()?;
        if changed.next().is_some() {
            return None;
        }

        let (mv, expected) = match next.pieces.get(&piece) {
            None => {
                if piece != PRIMARY_PIECE {
                    return None;
                }
                let (direction, lane) = self.exit_lane()?;
                let mv = Move {
                    piece,
                    direction,
                    distance: lane.len() + 1,
                };
                (mv, self.without_piece(piece))
            }
            Some(moved) => {
                if moved.len() != cells.len() {
                    return None;
                }
                let dr = moved[0].row - cells[0].row;
                let dc = moved[0].col - cells[0].col;
                let uniform = cells
                    .iter()
                    .zip(moved)
                    .all(|(a, b)| b.row - a.row == dr && b.col - a.col == dc);
                let direction = match (footprint_orientation(cells)?, dr.signum(), dc.signum()) {
                    (Orientation::Horizontal, 0, -1) => Direction::Left,
                    (Orientation::Horizontal, 0, 1) => Direction::Right,
                    (Orientation::Vertical, -1, 0) => Direction::Up,
                    (Orientation::Vertical, 1, 0) => Direction::Down,
                    _ => return None,
                };
                if !uniform {
                    return None;
                }
                let distance = (dr.abs() + dc.abs()) as usize;
                let mv = Move {
                    piece,
                    direction,
                    distance,
                };
                (mv, self.with_piece_shifted(piece, cells, direction, distance))
            }
        };

        if expected.grid == next.grid {
            Some(mv)
        } else {
            None
        }
    }

    /// Renders the board with the exit marker drawn outside the border.
    ///
    /// With `color`, ANSI escape codes paint the primary piece red, the piece
    /// named by `moved` yellow, other pieces blue and the exit green.
    pub fn render(&self, moved: Option<char>, color: bool) -> String {
        let paint = |marker: char, code: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", code, marker)
            } else {
                marker.to_string()
            }
        };
        let exit = paint(EXIT_MARKER, "32");
        let (rows, cols) = (self.rows as i32, self.cols as i32);
        let left_exit = self.exit.col == -1;

        let mut lines = Vec::with_capacity(self.rows + 2);
        if self.exit.row == -1 {
            lines.push(format!("{}{}", " ".repeat(self.exit.col as usize), exit));
        }
        for r in 0..rows {
            let mut line = String::new();
            if left_exit {
                line.push_str(if self.exit.row == r { exit.as_str() } else { " " });
            }
            for c in 0..cols {
                let marker = self.grid[r as usize * self.cols + c as usize];
                let cell = match marker {
                    EMPTY => marker.to_string(),
                    PRIMARY_PIECE => paint(marker, "31"),
                    m if Some(m) == moved => paint(marker, "33"),
                    _ => paint(marker, "34"),
                };
                line.push_str(&cell);
            }
            if self.exit.col == cols && self.exit.row == r {
                line.push_str(&exit);
            }
            lines.push(line);
        }
        if self.exit.row == rows {
            lines.push(format!("{}{}", " ".repeat(self.exit.col as usize), exit));
        }
        lines.join("\n")
    }
}

impl fmt::Display for Board {
    /// Formats the bare grid, one line per row, without the exit marker.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid_rows().join("\n"))
    }
}
