//! # Rush Hour Solver Library
//!
//! This library models Rush Hour sliding-block puzzles and searches for
//! move sequences that drive the primary piece `P` out through the exit.
//!
//! It is used by two binaries:
//! - `rush_solver`: Loads a puzzle file, solves it with the chosen strategy
//!   (or compares all of them) and prints the solution step by step.
//! - `heuristic_evaluator`: Scrambles a puzzle into random instances and
//!   reports average effort and solution length per strategy.
//!
//! ## Modules
//! - `engine`: The board representation (`Board`), move labels (`Move`),
//!   successor generation, the goal test and move attribution.
//! - `heuristics`: The distance (H1) and blocking (H2) estimators.
//! - `solver`: The search engines (UCS, GBFS, A*, IDA*) and solution reconstruction.
//! - `utils`: Puzzle file parsing and validation, and random scrambling.
//! - `error`: Error types for loading puzzles and replaying solutions.

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod solver;
pub mod utils;

pub use engine::{Board, Move};
pub use error::{PuzzleError, ReplayError};
pub use heuristics::Heuristic;
pub use solver::{Algorithm, SearchOutcome, SearchStats, Solution, Strategy};
