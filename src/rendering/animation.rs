//! Animation coordinator
//!
//! Every applied move produces a new board snapshot, but the view keeps
//! showing the previous one for a short commit delay while the moving pieces
//! slide between square anchors. When the delay runs out the snapshot is
//! committed and the transient offsets are dropped.
//!
//! A move scheduled while another commit is still pending replaces it: the
//! newest snapshot wins and the older transitions are discarded.

use super::anchors::SquareAnchors;
use crate::game::board::{Board, Orientation};
use crate::game::reconciler::{AppliedMove, MoveSource};
use crate::game::types::Square;
use bevy_ecs::prelude::*;
use bevy_math::{Rect, Vec2};
use std::time::Duration;
use tracing::debug;

/// Transient visual change for one square
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PieceTransition {
    /// Piece on `from` is translated by `delta` towards `to`
    Slide { from: Square, to: Square, delta: Vec2 },
    /// Piece on `square` disappears (en-passant capture)
    Vanish { square: Square },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingCommit {
    board: Board,
    due: Duration,
}

/// Resource owning the displayed snapshot and the commit timer
#[derive(Resource, Debug, Clone)]
pub struct AnimationCoordinator {
    orientation: Orientation,
    commit_delay: Duration,
    bounds: Option<Rect>,
    anchors: Option<SquareAnchors>,
    displayed: Board,
    transitions: Vec<PieceTransition>,
    pending: Option<PendingCommit>,
}

impl Default for AnimationCoordinator {
    fn default() -> Self {
        AnimationCoordinator::new(Orientation::WhiteBottom, Duration::from_millis(100))
    }
}

impl AnimationCoordinator {
    pub fn new(orientation: Orientation, commit_delay: Duration) -> Self {
        AnimationCoordinator {
            orientation,
            commit_delay,
            bounds: None,
            anchors: None,
            displayed: Board::starting_position(),
            transitions: Vec::new(),
            pending: None,
        }
    }

    /// Recompute anchors for a new board rectangle
    pub fn on_resize(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.anchors = SquareAnchors::compute(bounds, self.orientation);
        debug!("[ANIM] Anchors recomputed for {:?}", bounds);
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.anchors = self
            .bounds
            .and_then(|bounds| SquareAnchors::compute(bounds, orientation));
    }

    /// Show `board` immediately, dropping anything in flight
    pub fn reset(&mut self, board: Board) {
        self.displayed = board;
        self.transitions.clear();
        self.pending = None;
    }

    /// Start the transition for an applied move
    ///
    /// Returns `true` when the commit is deferred. Without anchors, or when
    /// nothing visible moves, the snapshot is committed on the spot.
    pub fn schedule(&mut self, applied: &AppliedMove, now: Duration) -> bool {
        let plan = &applied.plan;
        let transitions: Vec<PieceTransition> = match &self.anchors {
            Some(anchors) => plan
                .relocations
                .iter()
                .enumerate()
                // A dropped piece already sits under the pointer
                .filter(|(index, _)| !(*index == 0 && applied.source == MoveSource::LocalDrop))
                .map(|(_, &(from, to))| PieceTransition::Slide {
                    from,
                    to,
                    delta: anchors.delta(from, to),
                })
                .chain(
                    plan.vanished
                        .iter()
                        .map(|&square| PieceTransition::Vanish { square }),
                )
                .collect(),
            None => Vec::new(),
        };

        if transitions.is_empty() {
            self.reset(plan.board);
            return false;
        }

        if self.pending.is_some() {
            debug!("[ANIM] Pending commit superseded by {}", plan.mv);
        }
        self.transitions = transitions;
        self.pending = Some(PendingCommit {
            board: plan.board,
            due: now + self.commit_delay,
        });
        true
    }

    /// Commit the pending snapshot once its delay has elapsed
    pub fn poll(&mut self, now: Duration) -> Option<Board> {
        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.reset(pending.board);
        Some(pending.board)
    }

    /// Commit whatever is pending right now and stop animating
    pub fn cancel(&mut self) -> Option<Board> {
        self.transitions.clear();
        let pending = self.pending.take()?;
        self.displayed = pending.board;
        Some(pending.board)
    }

    pub fn displayed(&self) -> &Board {
        &self.displayed
    }

    pub fn anchors(&self) -> Option<&SquareAnchors> {
        self.anchors.as_ref()
    }

    pub fn transitions(&self) -> &[PieceTransition] {
        &self.transitions
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Transient offset for the piece currently drawn on `square`
    pub fn offset_for(&self, square: Square) -> Vec2 {
        self.transitions
            .iter()
            .filter_map(|transition| match transition {
                PieceTransition::Slide { from, delta, .. } if *from == square => Some(*delta),
                _ => None,
            })
            .sum()
    }

    pub fn is_vanishing(&self, square: Square) -> bool {
        self.transitions
            .iter()
            .any(|transition| matches!(transition, PieceTransition::Vanish { square: s } if *s == square))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::classifier::{classify, plan_move, SelectedPiece};
    use crate::game::types::{Piece, PieceColor, PieceKind};

    fn sq(text: &str) -> Square {
        Square::from_algebraic(text).unwrap()
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn applied(board: &Board, from: &str, to: &str, source: MoveSource) -> AppliedMove {
        let piece = board.piece_at(sq(from)).unwrap();
        let selected = SelectedPiece {
            piece,
            origin: sq(from),
        };
        let kind = classify(board, &selected, sq(to), piece.color);
        AppliedMove {
            plan: plan_move(board, selected, sq(to), piece.color, kind),
            source,
        }
    }

    fn laid_out() -> AnimationCoordinator {
        let mut coordinator = AnimationCoordinator::new(Orientation::WhiteBottom, ms(100));
        coordinator.on_resize(Rect::new(0.0, 0.0, 800.0, 800.0));
        coordinator
    }

    #[test]
    fn test_commit_waits_for_delay() {
        let mut coordinator = laid_out();
        let start = Board::starting_position();
        let mv = applied(&start, "e2", "e4", MoveSource::LocalClick);

        assert!(coordinator.schedule(&mv, ms(1_000)));
        assert_eq!(coordinator.displayed(), &start, "old snapshot shown while sliding");
        assert_eq!(coordinator.offset_for(sq("e2")), Vec2::new(0.0, -200.0));

        assert_eq!(coordinator.poll(ms(1_050)), None);
        assert_eq!(coordinator.poll(ms(1_100)), Some(mv.plan.board));
        assert_eq!(coordinator.displayed(), &mv.plan.board);
        assert!(coordinator.transitions().is_empty());
        assert!(!coordinator.is_pending());
    }

    #[test]
    fn test_castle_slides_king_and_rook() {
        let mut coordinator = laid_out();
        let board = Board::empty()
            .with_piece(sq("e1"), Piece::new(PieceKind::King, PieceColor::White))
            .with_piece(sq("h1"), Piece::new(PieceKind::Rook, PieceColor::White));
        let mv = applied(&board, "e1", "g1", MoveSource::Remote);

        coordinator.schedule(&mv, ms(0));
        assert_eq!(coordinator.transitions().len(), 2);
        assert_eq!(coordinator.offset_for(sq("e1")), Vec2::new(200.0, 0.0));
        assert_eq!(coordinator.offset_for(sq("h1")), Vec2::new(-200.0, 0.0));
    }

    #[test]
    fn test_en_passant_marks_vanishing_pawn() {
        let mut coordinator = laid_out();
        let board = Board::empty()
            .with_piece(sq("e5"), Piece::new(PieceKind::Pawn, PieceColor::White))
            .with_piece(sq("d5"), Piece::new(PieceKind::Pawn, PieceColor::Black));
        let mv = applied(&board, "e5", "d6", MoveSource::LocalClick);

        coordinator.schedule(&mv, ms(0));
        assert!(coordinator.is_vanishing(sq("d5")));
        assert!(!coordinator.is_vanishing(sq("e5")));
    }

    #[test]
    fn test_drop_commits_immediately() {
        //! A dropped plain move has nothing left to slide
        let mut coordinator = laid_out();
        let start = Board::starting_position();
        let mv = applied(&start, "g1", "f3", MoveSource::LocalDrop);

        assert!(!coordinator.schedule(&mv, ms(0)));
        assert_eq!(coordinator.displayed(), &mv.plan.board);
    }

    #[test]
    fn test_no_anchors_commits_immediately() {
        let mut coordinator = AnimationCoordinator::default();
        let start = Board::starting_position();
        let mv = applied(&start, "e2", "e4", MoveSource::Remote);
        assert!(!coordinator.schedule(&mv, ms(0)));
        assert_eq!(coordinator.displayed(), &mv.plan.board);
    }

    #[test]
    fn test_newer_move_supersedes_pending_commit() {
        let mut coordinator = laid_out();
        let start = Board::starting_position();
        let first = applied(&start, "e2", "e4", MoveSource::LocalClick);
        let second = applied(&first.plan.board, "e7", "e5", MoveSource::Remote);

        coordinator.schedule(&first, ms(0));
        coordinator.schedule(&second, ms(50));

        assert_eq!(coordinator.poll(ms(100)), None, "deadline moved with the newer move");
        assert_eq!(coordinator.poll(ms(150)), Some(second.plan.board));
    }

    #[test]
    fn test_cancel_snaps_to_newest() {
        let mut coordinator = laid_out();
        let start = Board::starting_position();
        let mv = applied(&start, "d2", "d4", MoveSource::LocalClick);
        coordinator.schedule(&mv, ms(0));

        assert_eq!(coordinator.cancel(), Some(mv.plan.board));
        assert_eq!(coordinator.displayed(), &mv.plan.board);
        assert_eq!(coordinator.cancel(), None);
    }

    #[test]
    fn test_orientation_change_recomputes_anchors() {
        let mut coordinator = laid_out();
        coordinator.set_orientation(Orientation::BlackBottom);
        let anchors = coordinator.anchors().unwrap();
        assert_eq!(anchors.anchor(sq("a1")), Vec2::new(800.0, 0.0));
    }
}
