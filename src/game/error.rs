//! Error types for game module
//!
//! Covers decoding of board coordinates, move notation and the small integer
//! codes the match server uses for colors and outcomes. Rejected *local* moves
//! are not errors: the legal-move gate simply returns `None`.

/// Errors that can occur while decoding game data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Square text was not a file letter followed by a rank digit
    #[error("Invalid square: {text:?}")]
    InvalidSquare { text: String },

    /// Move notation had the wrong length or undecodable squares
    #[error("Invalid move notation: {text:?}")]
    InvalidNotation { text: String },

    /// Trailing promotion letter was not one of q, r, b, n
    #[error("Invalid promotion piece: {letter:?}")]
    InvalidPromotion { letter: char },

    /// Color code outside 0 (black) / 1 (white)
    #[error("Invalid color code: {code}")]
    InvalidColor { code: u8 },

    /// Outcome code outside 1..=14
    #[error("Invalid outcome code: {code}")]
    InvalidOutcome { code: u8 },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
