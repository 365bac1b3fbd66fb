//! Board snapshot and seat orientation
//!
//! [`Board`] is a flat 64-cell value. Every mutation builds a fresh snapshot
//! through [`Board::with_changes`], so a snapshot handed to the view can never
//! be observed half-updated.

use super::types::{Piece, PieceColor, PieceKind, Square};
use std::fmt;

/// Back rank layout, a-file to h-file
const BACK_ROW: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Immutable 8×8 board snapshot indexed by canonical (rank, file)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Board {
    pub const fn empty() -> Self {
        Board { cells: [None; 64] }
    }

    /// Standard starting position
    pub fn starting_position() -> Self {
        let mut cells = [None; 64];
        for (file, &kind) in BACK_ROW.iter().enumerate() {
            cells[file] = Some(Piece::new(kind, PieceColor::White));
            cells[8 + file] = Some(Piece::new(PieceKind::Pawn, PieceColor::White));
            cells[48 + file] = Some(Piece::new(PieceKind::Pawn, PieceColor::Black));
            cells[56 + file] = Some(Piece::new(kind, PieceColor::Black));
        }
        Board { cells }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.index()]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Build the next snapshot with the given cells overwritten, in order
    pub fn with_changes(&self, changes: &[(Square, Option<Piece>)]) -> Board {
        let mut next = *self;
        for &(square, piece) in changes {
            next.cells[square.index()] = piece;
        }
        next
    }

    /// Builder used to set up positions
    pub fn with_piece(self, square: Square, piece: Piece) -> Board {
        self.with_changes(&[(square, Some(piece))])
    }

    /// Occupied squares, a1 first
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| self.piece_at(square).map(|p| (square, p)))
    }

    pub fn find_king(&self, color: PieceColor) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == color)
            .map(|(square, _)| square)
    }

    /// Text dump with the seat's own pieces at the bottom
    pub fn render(&self, orientation: Orientation) -> String {
        let mut out = String::with_capacity(8 * 20);
        for row in 0..8 {
            let rank = orientation.view_to_square(row, 0).rank;
            out.push(char::from(b'0' + rank.to_number()));
            out.push(' ');
            for col in 0..8 {
                let square = orientation.view_to_square(row, col);
                out.push(self.piece_at(square).map_or('.', Piece::symbol));
                out.push(' ');
            }
            out.pop();
            out.push('\n');
        }
        out.push_str("  ");
        for col in 0..8 {
            out.push(orientation.view_to_square(0, col).file.to_char());
            out.push(' ');
        }
        out.pop();
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting_position()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board")?;
        write!(f, "{}", self.render(Orientation::WhiteBottom))
    }
}

/// Presentation order of the board for one seat
///
/// The White seat sees rank 8 at the top and the a-file on the left; the Black
/// seat sees both axes reversed. Only view rows/columns are transformed: the
/// returned [`Square`] is always canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    WhiteBottom,
    BlackBottom,
}

impl Orientation {
    pub fn for_seat(color: PieceColor) -> Self {
        match color {
            PieceColor::White => Orientation::WhiteBottom,
            PieceColor::Black => Orientation::BlackBottom,
        }
    }

    /// Map a view cell (row 0 at the top, column 0 on the left) to its square
    pub fn view_to_square(self, row: u8, col: u8) -> Square {
        match self {
            Orientation::WhiteBottom => Square::at(7 - row, col),
            Orientation::BlackBottom => Square::at(row, 7 - col),
        }
    }

    /// Inverse of [`Orientation::view_to_square`]
    pub fn square_to_view(self, square: Square) -> (u8, u8) {
        let (rank, file) = square.to_tuple();
        match self {
            Orientation::WhiteBottom => (7 - rank, file),
            Orientation::BlackBottom => (rank, 7 - file),
        }
    }
}
