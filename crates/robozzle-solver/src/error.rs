//! Error types for the solver boundary.
//!
//! The interpreter itself never fails with an error: a failing run is an
//! ordinary [`ExecutionStatus`](crate::executor::ExecutionStatus). These
//! errors cover what the drivers reject before any search starts.

use thiserror::Error;

/// Rejected puzzle or solver parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No function lengths were given.
    #[error("at least one function is required")]
    NoFunctions,
    /// More than five functions were requested.
    #[error("at most 5 functions are supported, got {0}")]
    TooManyFunctions(usize),
    /// A function was declared with zero slots (1-based function number).
    #[error("function F{0} has no slots")]
    EmptyFunction(usize),
    /// The board carries no star.
    #[error("puzzle has no stars")]
    NoStars,
    /// The start position lies outside the board.
    #[error("start position ({x}, {y}) is outside the board")]
    StartOutOfBounds { x: i32, y: i32 },
    /// The start cell is not painted.
    #[error("start position ({x}, {y}) is not painted")]
    StartUnpainted { x: i32, y: i32 },
    /// The evolutionary search needs at least two individuals.
    #[error("population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
}

/// Failure to read or parse a puzzle description.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to read puzzle: {0}")]
    Io(#[from] std::io::Error),
    #[error("puzzle description is empty")]
    MissingHeader,
    #[error("invalid size header {0:?}, expected \"height width\"")]
    InvalidHeader(String),
    #[error("invalid puzzle size {width}x{height}")]
    InvalidSize { width: i64, height: i64 },
    #[error("expected {expected} grid rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}
