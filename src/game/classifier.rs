//! Move classification and snapshot planning
//!
//! Pure predicates that decide which of the special chess moves a
//! (selected piece, destination) pair represents, and the planner that turns
//! an accepted move into the next [`Board`] snapshot plus the list of visible
//! piece relocations the animation layer replays.
//!
//! The classifier never decides legality. Whether a move may be played at all
//! comes from the server-supplied legal-move set; by the time a move reaches
//! [`plan_move`] it has already passed that gate.
//!
//! # Priority
//!
//! Categories are checked in a fixed order and the first match wins:
//!
//! ```text
//! promotion → castle (kingside / queenside) → en passant → normal
//! ```
//!
//! They cannot overlap: a promotion needs a pawn, a castle needs a king on its
//! home square and an en-passant capture needs a pawn moving diagonally onto an
//! empty square, which never happens on the promotion rank.

use super::board::Board;
use super::notation::Move;
use super::types::{Piece, PieceColor, PieceKind, Square};

/// A piece picked up from its origin square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedPiece {
    pub piece: Piece,
    pub origin: Square,
}

/// Category of an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    Promotion,
    CastleKingside,
    CastleQueenside,
    EnPassant,
}

impl MoveKind {
    pub fn is_castle(self) -> bool {
        matches!(self, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }
}

/// King on its home square moving exactly two files sideways
pub fn is_castle(selected: &SelectedPiece, destination: Square, mover: PieceColor) -> bool {
    let home = Square {
        rank: mover.home_rank(),
        file: 4.into(),
    };
    selected.piece.kind == PieceKind::King
        && selected.origin == home
        && destination.file.index().abs_diff(selected.origin.file.index()) == 2
}

/// Pawn moving diagonally onto an empty square
pub fn is_en_passant(board: &Board, selected: &SelectedPiece, destination: Square) -> bool {
    selected.piece.kind == PieceKind::Pawn
        && board.is_empty(destination)
        && destination.file != selected.origin.file
        && destination.rank != selected.origin.rank
}

/// Pawn arriving on the mover's farthest rank
pub fn is_promotion(selected: &SelectedPiece, destination: Square, mover: PieceColor) -> bool {
    selected.piece.kind == PieceKind::Pawn && destination.rank == mover.promotion_rank()
}

/// Decide the category of a move in priority order
pub fn classify(
    board: &Board,
    selected: &SelectedPiece,
    destination: Square,
    mover: PieceColor,
) -> MoveKind {
    if is_promotion(selected, destination, mover) {
        MoveKind::Promotion
    } else if is_castle(selected, destination, mover) {
        match destination.file.index() {
            6 => MoveKind::CastleKingside,
            2 => MoveKind::CastleQueenside,
            // Unreachable for a king on e-file moving two files
            _ => MoveKind::Normal,
        }
    } else if is_en_passant(board, selected, destination) {
        MoveKind::EnPassant
    } else {
        MoveKind::Normal
    }
}

/// Everything the rest of the client needs to know about an accepted move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// The move as it goes on the wire (promotion always a queen)
    pub mv: Move,
    pub kind: MoveKind,
    pub mover: PieceColor,
    /// Snapshot after the move
    pub board: Board,
    /// Visible slides, primary piece first
    pub relocations: Vec<(Square, Square)>,
    /// Squares whose piece disappears without being replaced
    pub vanished: Vec<Square>,
}

/// Build the next snapshot for a move of the given category
///
/// `kind` normally comes from [`classify`]; callers with better information
/// (an explicit castle flag from the server) may pass their own.
pub fn plan_move(
    board: &Board,
    selected: SelectedPiece,
    destination: Square,
    mover: PieceColor,
    kind: MoveKind,
) -> MovePlan {
    let origin = selected.origin;
    let mut mv = Move::new(origin, destination);
    let mut relocations = vec![(origin, destination)];
    let mut vanished = Vec::new();

    let changes: Vec<(Square, Option<Piece>)> = match kind {
        MoveKind::Promotion => {
            mv = mv.with_promotion(PieceKind::Queen);
            vec![
                (origin, None),
                (destination, Some(Piece::new(PieceKind::Queen, mover))),
            ]
        }
        MoveKind::CastleKingside | MoveKind::CastleQueenside => {
            let rank = origin.rank.index();
            let (rook_from, rook_to) = if kind == MoveKind::CastleKingside {
                (Square::at(rank, 7), Square::at(rank, 5))
            } else {
                (Square::at(rank, 0), Square::at(rank, 3))
            };
            let rook = board
                .piece_at(rook_from)
                .unwrap_or(Piece::new(PieceKind::Rook, mover));
            relocations.push((rook_from, rook_to));
            vec![
                (origin, None),
                (rook_from, None),
                (destination, Some(selected.piece)),
                (rook_to, Some(rook)),
            ]
        }
        MoveKind::EnPassant => {
            let captured = Square {
                rank: origin.rank,
                file: destination.file,
            };
            vanished.push(captured);
            vec![
                (origin, None),
                (captured, None),
                (destination, Some(selected.piece)),
            ]
        }
        MoveKind::Normal => vec![(origin, None), (destination, Some(selected.piece))],
    };

    MovePlan {
        mv,
        kind,
        mover,
        board: board.with_changes(&changes),
        relocations,
        vanished,
    }
}
