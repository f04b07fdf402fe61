//! Error types for the engine.
//!
//! Configuration problems are reported when an engine or board is built and are never
//! silently replaced by defaults. Search problems come back from a single search call.

use thiserror::Error;

/// Errors raised while validating a configuration or constructing a board.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board size must be at least 1")]
    EmptyBoard,

    #[error("board size {size} exceeds the {max}-column limit of the packed board")]
    BoardTooLarge { size: usize, max: usize },

    #[error("win length {win_length} must be between 1 and the board size {board_size}")]
    InvalidWinLength { win_length: usize, board_size: usize },

    #[error("iteration budget must be positive")]
    ZeroIterations,

    #[error("exploration constant must be finite and non-negative, got {0}")]
    InvalidExploration(f64),

    #[error("unknown selection policy '{0}'")]
    UnknownPolicy(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for ConfigError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        ConfigError::ThreadPool(err.to_string())
    }
}

/// Errors that can occur during a search call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("search finished without producing a move")]
    NoMoveFound,

    #[error("move {0} is not an untried move of this node")]
    MoveNotUntried(String),

    #[error("cannot merge nodes created by different moves")]
    MergeMismatch,
}

/// Top-level error used by the binaries.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
