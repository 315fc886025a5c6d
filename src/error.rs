//! Error types for puzzle loading and solution replay.
//!
//! Search exhaustion is not an error: engines report it as an outcome with
//! no solution. Everything here is either a rejected puzzle definition or a
//! solution that does not replay against its initial board.

use std::io;

/// Reasons a puzzle definition is rejected before any search starts.
#[derive(thiserror::Error, Debug)]
pub enum PuzzleError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed header: {0}")]
    Header(String),
    #[error("invalid dimensions {rows}x{cols}: both must be between 1 and 20")]
    Dimensions { rows: usize, cols: usize },
    #[error("invalid number of pieces {0}: must be between 0 and 50")]
    PieceCount(usize),
    #[error("row {row} has incorrect length: expected {expected}, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("no exit 'K' found outside the board")]
    MissingExit,
    #[error("more than one exit 'K' found")]
    MultipleExits,
    #[error("exit 'K' found inside the board at ({row}, {col})")]
    ExitInsideBoard { row: usize, col: usize },
    #[error("exit at ({row}, {col}) is not on the board border")]
    ExitNotOnBorder { row: i32, col: i32 },
    #[error("no primary piece 'P' found on the board")]
    MissingPrimary,
    #[error("piece '{0}' must occupy at least 2 cells")]
    PieceTooShort(char),
    #[error("piece '{0}' must form a continuous horizontal or vertical line")]
    PieceShape(char),
    #[error("exit is not aligned with the primary piece's axis")]
    ExitMisaligned,
}

/// Reasons a solution fails to replay against its initial board.
///
/// `UnattributedMove` is the one that matters most: it means two
/// consecutive states differ in a way no single legal slide explains, which
/// points at a move-generation defect rather than a bad input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("step {step}: no single piece accounts for the change between states")]
    UnattributedMove { step: usize },
    #[error("step {step}: move {label} is not legal from the previous state")]
    IllegalMove { step: usize, label: String },
    #[error("step {step}: replayed state differs from the recorded state")]
    StateMismatch { step: usize },
    #[error("solution has {states} states but {moves} moves")]
    LengthMismatch { states: usize, moves: usize },
}
