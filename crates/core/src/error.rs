use thiserror::Error;

/// Errors raised by game-state implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Game is not terminal")]
    NotTerminal,
}

/// Convenience Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;
