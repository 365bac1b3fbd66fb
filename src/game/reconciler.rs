//! Board reconciliation
//!
//! [`MatchBoard`] owns the client's copy of the position and keeps it in step
//! with the authoritative server. Two paths mutate it:
//!
//! - **Local moves** are gated by the server-supplied [`LegalMoveSet`], applied
//!   optimistically and handed to the outbound channel in the same call.
//! - **Remote updates** replace turn, check flag, legal moves and outcome, and
//!   replay the opponent's move through the same classifier the local path
//!   uses.
//!
//! Both paths return an [`AppliedMove`] so the animation layer can play the
//! relocation before the new snapshot is committed to the view.

use super::board::Board;
use super::classifier::{classify, plan_move, MoveKind, MovePlan, SelectedPiece};
use super::notation::Move;
use super::session::{MatchOutcome, Outbound, RoundResult};
use super::types::{PieceColor, Square};
use crate::networking::protocol::{CastleSide, ClientAction, MoveUpdate};
use bevy_ecs::prelude::*;
use tracing::{debug, info, warn};

/// Moves the side to move may currently play, as supplied by the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalMoveSet {
    moves: Vec<Move>,
}

impl LegalMoveSet {
    /// Decode a server list, dropping entries that do not parse
    pub fn from_notation<S: AsRef<str>>(items: &[S]) -> Self {
        let moves = items
            .iter()
            .filter_map(|item| match Move::from_uci(item.as_ref()) {
                Ok(mv) => Some(mv),
                Err(e) => {
                    warn!("[MATCH] Skipping undecodable legal move: {}", e);
                    None
                }
            })
            .collect();
        LegalMoveSet { moves }
    }

    /// White's twenty moves from the starting position
    pub fn opening() -> Self {
        let mut moves = Vec::with_capacity(20);
        for file in 0..8 {
            moves.push(Move::new(Square::at(1, file), Square::at(2, file)));
            moves.push(Move::new(Square::at(1, file), Square::at(3, file)));
        }
        for (from, targets) in [(1, [0, 2]), (6, [5, 7])] {
            for to in targets {
                moves.push(Move::new(Square::at(0, from), Square::at(2, to)));
            }
        }
        LegalMoveSet { moves }
    }

    pub fn contains(&self, from: Square, to: Square) -> bool {
        self.moves.iter().any(|mv| mv.connects(from, to))
    }

    pub fn destinations_from(&self, from: Square) -> impl Iterator<Item = Square> + '_ {
        self.moves
            .iter()
            .filter(move |mv| mv.from == from)
            .map(|mv| mv.to)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// How a local destination was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// Clicked destination: the piece slides there
    LocalClick,
    /// Dragged and dropped: the piece is already under the pointer
    LocalDrop,
    /// Opponent's move replayed from a server update
    Remote,
}

/// A move that produced a new snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub plan: MovePlan,
    pub source: MoveSource,
}

/// Client-side copy of the round in progress
#[derive(Resource, Debug, Clone)]
pub struct MatchBoard {
    local_color: PieceColor,
    board: Board,
    legal_moves: LegalMoveSet,
    selection: Option<SelectedPiece>,
    turn: PieceColor,
    is_check: bool,
    last_move: Option<Move>,
    /// Local move awaiting the server echo
    pending_echo: Option<Move>,
    round_result: Option<RoundResult>,
}

impl Default for MatchBoard {
    fn default() -> Self {
        MatchBoard::new(PieceColor::White)
    }
}

impl MatchBoard {
    pub fn new(local_color: PieceColor) -> Self {
        MatchBoard {
            local_color,
            board: Board::starting_position(),
            legal_moves: LegalMoveSet::opening(),
            selection: None,
            turn: PieceColor::White,
            is_check: false,
            last_move: None,
            pending_echo: None,
            round_result: None,
        }
    }

    /// Reset everything for a new round, possibly with swapped seats
    pub fn start_round(&mut self, local_color: PieceColor) {
        *self = MatchBoard::new(local_color);
        info!(
            "[MATCH] Round started, playing {}",
            local_color.name().to_lowercase()
        );
    }

    pub fn local_color(&self) -> PieceColor {
        self.local_color
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> PieceColor {
        self.turn
    }

    pub fn is_check(&self) -> bool {
        self.is_check
    }

    pub fn legal_moves(&self) -> &LegalMoveSet {
        &self.legal_moves
    }

    pub fn selection(&self) -> Option<SelectedPiece> {
        self.selection
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn round_result(&self) -> Option<RoundResult> {
        self.round_result
    }

    pub fn is_my_turn(&self) -> bool {
        self.turn == self.local_color
    }

    /// True once the round has an outcome
    pub fn is_terminal(&self) -> bool {
        self.round_result.is_some()
    }

    /// Pick up an own piece; any other square leaves the selection as it was
    pub fn select(&mut self, square: Square) -> bool {
        if self.is_terminal() {
            return false;
        }
        match self.board.piece_at(square) {
            Some(piece) if piece.color == self.local_color => {
                self.selection = Some(SelectedPiece {
                    piece,
                    origin: square,
                });
                debug!("[MATCH] Selected {:?} on {}", piece.kind, square);
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Try to play the selected piece to `destination`
    ///
    /// Rejections are silent: the board, the selection and the outbound sink
    /// are left untouched and `None` is returned.
    pub fn apply_local_move(
        &mut self,
        destination: Square,
        source: MoveSource,
        outbound: &mut impl Outbound,
    ) -> Option<AppliedMove> {
        let selected = self.selection?;
        if self.is_terminal()
            || !self.is_my_turn()
            || selected.origin == destination
            || !self.legal_moves.contains(selected.origin, destination)
        {
            debug!(
                "[MATCH] Rejected local move {}{}",
                selected.origin, destination
            );
            return None;
        }

        let kind = classify(&self.board, &selected, destination, self.local_color);
        let plan = plan_move(&self.board, selected, destination, self.local_color, kind);

        self.board = plan.board;
        self.selection = None;
        self.last_move = Some(plan.mv);
        self.pending_echo = Some(plan.mv);
        self.turn = self.local_color.opponent();
        self.is_check = false;

        info!("[MATCH] Local move {} ({:?})", plan.mv, kind);
        outbound.send(ClientAction::Move(plan.mv.to_uci()));

        Some(AppliedMove { plan, source })
    }

    /// Fold an authoritative `move` update into the local state
    ///
    /// Returns the replayed opponent move when the update carried one
    /// addressed to the local player.
    pub fn apply_remote_update(&mut self, update: &MoveUpdate) -> Option<AppliedMove> {
        let mut applied = None;

        if let Some(turn) = update.turn {
            if turn == self.local_color {
                if let Some(text) = update.mv.as_deref() {
                    applied = self.replay_opponent_move(text, update);
                }
                if let Some(list) = &update.legal_moves {
                    self.legal_moves = LegalMoveSet::from_notation(list);
                }
            } else if let Some(text) = update.mv.as_deref() {
                self.check_echo(text);
            }

            self.turn = turn;
        }
        self.is_check = update.is_check.unwrap_or(false);

        if let Some(outcome) = update.outcome {
            self.record_outcome(outcome, update.winner);
        }

        applied
    }

    fn replay_opponent_move(&mut self, text: &str, update: &MoveUpdate) -> Option<AppliedMove> {
        let mv = match Move::from_uci(text) {
            Ok(mv) => mv,
            Err(e) => {
                warn!("[MATCH] Ignoring remote move: {}", e);
                return None;
            }
        };
        let Some(piece) = self.board.piece_at(mv.from) else {
            warn!("[MATCH] Remote move {} has no piece on its origin", mv);
            return None;
        };

        let mover = self.local_color.opponent();
        let selected = SelectedPiece {
            piece,
            origin: mv.from,
        };
        let derived = classify(&self.board, &selected, mv.to, mover);
        let kind = hinted_kind(update, derived);
        if kind != derived {
            warn!(
                "[MATCH] Server marks {} as {:?}, local classifier said {:?}",
                mv, kind, derived
            );
        }

        let plan = plan_move(&self.board, selected, mv.to, mover, kind);
        self.board = plan.board;
        self.selection = None;
        self.pending_echo = None;
        self.last_move = update
            .move_stack
            .as_ref()
            .and_then(|stack| stack.last())
            .and_then(|last| Move::from_uci(last).ok())
            .or(Some(mv));

        info!("[MATCH] Remote move {} ({:?})", mv, kind);
        Some(AppliedMove {
            plan,
            source: MoveSource::Remote,
        })
    }

    /// Compare the server echo of our move with what we applied optimistically
    fn check_echo(&mut self, text: &str) {
        let Some(sent) = self.pending_echo.take() else {
            return;
        };
        match Move::from_uci(text) {
            Ok(echo) if echo.connects(sent.from, sent.to) => {
                debug!("[MATCH] Server confirmed {}", echo);
            }
            _ => warn!(
                "[MATCH] Server echoed {:?} after local move {}; keeping local board",
                text, sent
            ),
        }
    }

    fn record_outcome(&mut self, outcome: MatchOutcome, winner: Option<PieceColor>) {
        if self.round_result.is_some() {
            return;
        }
        let result = RoundResult { outcome, winner };
        info!("[MATCH] Round over: {}", result.summary());
        self.round_result = Some(result);
        self.selection = None;
    }

    /// Destinations the selected piece may move to
    pub fn legal_destinations(&self) -> Vec<Square> {
        self.selection
            .map(|selected| self.legal_moves.destinations_from(selected.origin).collect())
            .unwrap_or_default()
    }

    /// Square of the side-to-move's king while it is in check
    pub fn checked_king_square(&self) -> Option<Square> {
        if !self.is_check {
            return None;
        }
        self.board.find_king(self.turn)
    }

    /// Whether the square is an endpoint of the previous move
    pub fn was_previous_move(&self, square: Square) -> bool {
        self.last_move
            .is_some_and(|mv| mv.from == square || mv.to == square)
    }
}

/// Prefer the server's explicit castle / en-passant flags over local derivation
fn hinted_kind(update: &MoveUpdate, derived: MoveKind) -> MoveKind {
    if derived == MoveKind::Promotion {
        return derived;
    }
    match update.castles {
        Some(CastleSide::Kingside) => MoveKind::CastleKingside,
        Some(CastleSide::Queenside) => MoveKind::CastleQueenside,
        None if update.en_passant == Some(true) => MoveKind::EnPassant,
        None => derived,
    }
}
