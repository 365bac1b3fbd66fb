//! Move notation and clock formatting
//!
//! Moves travel between client and server as 4-or-5 character strings: the
//! origin square, the destination square and an optional lowercase promotion
//! letter (`e2e4`, `e7e8q`). Squares are written from canonical (rank, file)
//! coordinates; the seat the player occupies never changes the text.

use super::error::{GameError, GameResult};
use super::types::{PieceKind, Square};
use std::fmt;
use std::str::FromStr;

/// A move between two canonical squares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }

    /// True when this move connects the two squares, ignoring promotion
    pub fn connects(&self, from: Square, to: Square) -> bool {
        self.from == from && self.to == to
    }

    /// Serialize to notation, e.g. `e2e4` or `a7a8q`
    pub fn to_uci(&self) -> String {
        self.to_string()
    }

    /// Decode notation sent by the server
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidNotation`] when the text is not 4 or 5
    /// characters of two valid squares, and [`GameError::InvalidPromotion`]
    /// when the trailing letter is not a promotion piece.
    pub fn from_uci(text: &str) -> GameResult<Self> {
        let invalid = || GameError::InvalidNotation {
            text: text.to_string(),
        };
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(invalid());
        }

        let from = Square::from_algebraic(&text[0..2]).map_err(|_| invalid())?;
        let to = Square::from_algebraic(&text[2..4]).map_err(|_| invalid())?;
        let promotion = match text[4..].chars().next() {
            Some(letter) => Some(PieceKind::from_promotion_letter(letter)?),
            None => None,
        };

        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = GameError;

    fn from_str(s: &str) -> GameResult<Self> {
        Move::from_uci(s)
    }
}

/// Format remaining milliseconds as `m:ss`
///
/// Minutes are not padded and may exceed 59; seconds are truncated.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(format_clock(300_000), "5:00");
/// assert_eq!(format_clock(61_999), "1:01");
/// ```
pub fn format_clock(milliseconds: u64) -> String {
    let minutes = milliseconds / 60_000;
    let seconds = (milliseconds % 60_000) / 1_000;
    format!("{minutes}:{seconds:02}")
}
