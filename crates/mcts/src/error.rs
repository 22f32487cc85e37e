use thiserror::Error;
use ucb_core::GameError;

/// Errors that can occur during tree search.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("No search tree has been built")]
    NoTree,

    #[error("External strategy did not provide a move")]
    NoMoveProposed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Inconsistent tree: {0}")]
    CorruptTree(String),

    #[error("Game error: {0}")]
    Game(#[from] GameError),
}

/// Convenience Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
