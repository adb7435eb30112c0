//! Error types for game module
//!
//! Provides custom error types for board interaction: move application,
//! position loading and undo. None of these are fatal; callers log them and
//! leave the board unchanged.

/// Errors that can occur in game logic
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The rules engine rejected the move
    #[error("Invalid move: {uci}")]
    InvalidMove { uci: String },

    /// A position string could not be parsed or describes an impossible position
    #[error("Invalid position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },

    /// Text that does not name a board square
    #[error("Invalid square: {input}")]
    InvalidSquare { input: String },

    /// Text that is not a 4 or 5 character UCI move
    #[error("Malformed move notation: {input}")]
    MalformedMove { input: String },

    /// Undo requested with an empty move history
    #[error("No moves to undo")]
    NothingToUndo,
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
