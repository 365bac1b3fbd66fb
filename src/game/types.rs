//! Type definitions and utilities for chess game logic
//!
//! Provides newtype patterns for board coordinates plus the piece value types
//! shared by the board, the move classifier and the wire protocol.
//!
//! Coordinates are canonical: rank 0 is White's back rank and file 0 is the
//! a-file, whichever seat the local player occupies. Seat-dependent flipping
//! lives in [`crate::game::board::Orientation`] and never leaks in here.

use super::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board coordinate representing a file (column) on the chessboard
///
/// Values range from 0 (file 'a') to 7 (file 'h').
/// This newtype prevents mixing up rank and file indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(pub u8);

impl File {
    /// Create a file from a character ('a'..='h')
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let file = File::from_char('e').unwrap(); // File 4
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(File(c as u8 - b'a')),
            _ => None,
        }
    }

    /// Convert file to character ('a'..='h')
    pub fn to_char(self) -> char {
        (b'a' + self.0) as char
    }

    /// Get the file index (0-7)
    pub fn index(self) -> u8 {
        self.0
    }
}

impl From<u8> for File {
    fn from(value: u8) -> Self {
        assert!(value < 8, "File must be in range 0-7");
        File(value)
    }
}

/// Board coordinate representing a rank (row) on the chessboard
///
/// Values range from 0 (rank 1) to 7 (rank 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u8);

impl Rank {
    /// Create a rank from a number (1-8)
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let rank = Rank::from_number(4).unwrap(); // Rank 3 (0-indexed)
    /// ```
    pub fn from_number(n: u8) -> Option<Self> {
        if (1..=8).contains(&n) {
            Some(Rank(n - 1))
        } else {
            None
        }
    }

    /// Convert rank to number (1-8)
    pub fn to_number(self) -> u8 {
        self.0 + 1
    }

    /// Get the rank index (0-7)
    pub fn index(self) -> u8 {
        self.0
    }
}

impl From<u8> for Rank {
    fn from(value: u8) -> Self {
        assert!(value < 8, "Rank must be in range 0-7");
        Rank(value)
    }
}

/// Board square position (rank, file)
///
/// Combines Rank and File into a single type-safe coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub rank: Rank,
    pub file: File,
}

impl Square {
    /// Create a square from rank and file indices
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let square = Square::at(3, 4); // e4
    /// ```
    pub fn at(rank: u8, file: u8) -> Self {
        Square {
            rank: Rank::from(rank),
            file: File::from(file),
        }
    }

    /// Checked variant of [`Square::at`]
    pub fn try_at(rank: u8, file: u8) -> Option<Self> {
        (rank < 8 && file < 8).then(|| Square::at(rank, file))
    }

    /// Create a square from a flat 0..64 index (rank-major)
    pub fn from_index(index: usize) -> Option<Self> {
        (index < 64).then(|| Square::at((index / 8) as u8, (index % 8) as u8))
    }

    /// Flat index into a rank-major 64-cell array
    pub fn index(self) -> usize {
        self.rank.index() as usize * 8 + self.file.index() as usize
    }

    /// Create a square from algebraic notation (e.g., "e4")
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let square = Square::from_algebraic("e4").unwrap();
    /// assert_eq!(square, Square::at(3, 4));
    /// ```
    pub fn from_algebraic(s: &str) -> GameResult<Self> {
        let invalid = || GameError::InvalidSquare {
            text: s.to_string(),
        };
        let mut chars = s.chars();
        let file = chars.next().and_then(File::from_char).ok_or_else(invalid)?;
        let rank = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|n| Rank::from_number(n as u8))
            .ok_or_else(invalid)?;
        if chars.next().is_some() {
            return Err(invalid());
        }
        Ok(Square { rank, file })
    }

    /// Convert square to algebraic notation (e.g., "e4")
    pub fn to_algebraic(self) -> String {
        self.to_string()
    }

    /// Convert to a (rank, file) tuple
    pub fn to_tuple(self) -> (u8, u8) {
        (self.rank.index(), self.file.index())
    }

    /// Iterate every square, a1 first, h8 last
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).filter_map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_number())
    }
}

impl From<(u8, u8)> for Square {
    fn from((rank, file): (u8, u8)) -> Self {
        Square::at(rank, file)
    }
}

/// Side of the board a piece (or player) belongs to
///
/// On the wire colors are small integers: `0` for Black, `1` for White.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PieceColor {
    #[default]
    White,
    Black,
}

impl PieceColor {
    pub fn opponent(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    /// Rank holding this side's king and rooks at the start of a round
    pub fn home_rank(self) -> Rank {
        match self {
            PieceColor::White => Rank(0),
            PieceColor::Black => Rank(7),
        }
    }

    /// Farthest rank for this side's pawns
    pub fn promotion_rank(self) -> Rank {
        self.opponent().home_rank()
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceColor::White => "White",
            PieceColor::Black => "Black",
        }
    }
}

impl TryFrom<u8> for PieceColor {
    type Error = GameError;

    fn try_from(code: u8) -> GameResult<Self> {
        match code {
            0 => Ok(PieceColor::Black),
            1 => Ok(PieceColor::White),
            _ => Err(GameError::InvalidColor { code }),
        }
    }
}

impl From<PieceColor> for u8 {
    fn from(color: PieceColor) -> Self {
        match color {
            PieceColor::Black => 0,
            PieceColor::White => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Lowercase letter used in move notation and board dumps
    pub fn letter(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }

    /// Parse a promotion letter; kings and pawns are never promotion targets
    pub fn from_promotion_letter(letter: char) -> GameResult<Self> {
        match letter.to_ascii_lowercase() {
            'q' => Ok(PieceKind::Queen),
            'r' => Ok(PieceKind::Rook),
            'b' => Ok(PieceKind::Bishop),
            'n' => Ok(PieceKind::Knight),
            _ => Err(GameError::InvalidPromotion { letter }),
        }
    }
}

/// A piece value; replaced wholesale (never mutated) on promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: PieceColor) -> Self {
        Piece { kind, color }
    }

    /// FEN-style character: uppercase for White, lowercase for Black
    pub fn symbol(self) -> char {
        let letter = self.kind.letter();
        match self.color {
            PieceColor::White => letter.to_ascii_uppercase(),
            PieceColor::Black => letter,
        }
    }
}
