//! Match session: round series, outcomes and player actions
//!
//! A match is a series of rounds. The server starts each round with a `start`
//! event, reports the round result inside a `move` update, and closes the
//! series with `matchEnded`. [`MatchSession`] tracks that bookkeeping and is the
//! single place that emits the non-move player actions (draw offers,
//! resignation, exit).

use super::error::{GameError, GameResult};
use super::types::PieceColor;
use crate::networking::protocol::ClientAction;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Sink for outbound client actions
///
/// Implemented for the ECS message writer used by the running app and for a
/// plain `Vec` so the match logic can be driven without a world.
pub trait Outbound {
    fn send(&mut self, action: ClientAction);
}

impl Outbound for Vec<ClientAction> {
    fn send(&mut self, action: ClientAction) {
        self.push(action);
    }
}

impl Outbound for MessageWriter<'_, ClientAction> {
    fn send(&mut self, action: ClientAction) {
        self.write(action);
    }
}

/// Why a round ended, with the server's numeric codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchOutcome {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
    FiftyMoves,
    ThreefoldRepetition,
    VariantWin,
    VariantLoss,
    VariantDraw,
    Timeout,
    Resignation,
    Agreement,
    Abandoned,
}

impl MatchOutcome {
    const ALL: [MatchOutcome; 14] = [
        MatchOutcome::Checkmate,
        MatchOutcome::Stalemate,
        MatchOutcome::InsufficientMaterial,
        MatchOutcome::SeventyFiveMoves,
        MatchOutcome::FivefoldRepetition,
        MatchOutcome::FiftyMoves,
        MatchOutcome::ThreefoldRepetition,
        MatchOutcome::VariantWin,
        MatchOutcome::VariantLoss,
        MatchOutcome::VariantDraw,
        MatchOutcome::Timeout,
        MatchOutcome::Resignation,
        MatchOutcome::Agreement,
        MatchOutcome::Abandoned,
    ];

    /// Wire code, 1-based
    pub fn code(self) -> u8 {
        Self::ALL
            .iter()
            .position(|outcome| *outcome == self)
            .map_or(0, |index| index as u8 + 1)
    }

    pub fn describe(self) -> &'static str {
        match self {
            MatchOutcome::Checkmate => "checkmate",
            MatchOutcome::Stalemate => "stalemate",
            MatchOutcome::InsufficientMaterial => "insufficient material",
            MatchOutcome::SeventyFiveMoves => "seventy-five move rule",
            MatchOutcome::FivefoldRepetition => "fivefold repetition",
            MatchOutcome::FiftyMoves => "fifty move rule",
            MatchOutcome::ThreefoldRepetition => "threefold repetition",
            MatchOutcome::VariantWin => "variant win",
            MatchOutcome::VariantLoss => "variant loss",
            MatchOutcome::VariantDraw => "variant draw",
            MatchOutcome::Timeout => "timeout",
            MatchOutcome::Resignation => "resignation",
            MatchOutcome::Agreement => "agreement",
            MatchOutcome::Abandoned => "abandonment",
        }
    }
}

impl TryFrom<u8> for MatchOutcome {
    type Error = GameError;

    fn try_from(code: u8) -> GameResult<Self> {
        code.checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
            .ok_or(GameError::InvalidOutcome { code })
    }
}

impl From<MatchOutcome> for u8 {
    fn from(outcome: MatchOutcome) -> Self {
        outcome.code()
    }
}

/// Terminal result of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub outcome: MatchOutcome,
    /// `None` for draws
    pub winner: Option<PieceColor>,
}

impl RoundResult {
    pub fn summary(&self) -> String {
        match self.winner {
            Some(color) => format!("{} wins by {}", color.name(), self.outcome.describe()),
            None => format!("Draw by {}", self.outcome.describe()),
        }
    }
}

/// Bookkeeping for the whole series of rounds
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct MatchSession {
    pub round: u32,
    pub total_rounds: u32,
    /// Points per color as `[black, white]`, indexed by wire color code
    pub match_score: Option<[f32; 2]>,
    pub draw_offered: bool,
    pub last_result: Option<RoundResult>,
    pub series_over: bool,
    pub overall_winner: Option<PieceColor>,
}

impl MatchSession {
    pub fn begin_round(&mut self, round: u32, total_rounds: u32) {
        self.round = round;
        self.total_rounds = total_rounds;
        self.draw_offered = false;
        self.last_result = None;
    }

    /// Record a round result; returns `false` when the round already had one
    pub fn record_result(&mut self, result: RoundResult, score: Option<[f32; 2]>) -> bool {
        if score.is_some() {
            self.match_score = score;
        }
        if self.last_result.is_some() {
            return false;
        }
        self.draw_offered = false;
        self.last_result = Some(result);
        true
    }

    pub fn end_series(&mut self, overall_winner: Option<PieceColor>) {
        self.series_over = true;
        self.overall_winner = overall_winner;
    }

    /// Score for one color, if the server has reported any
    pub fn score_of(&self, color: PieceColor) -> Option<f32> {
        self.match_score
            .map(|score| score[usize::from(u8::from(color))])
    }

    pub fn receive_draw_offer(&mut self) {
        if self.last_result.is_none() {
            self.draw_offered = true;
        }
    }

    pub fn offer_draw(&mut self, outbound: &mut impl Outbound) {
        outbound.send(ClientAction::OfferDraw);
    }

    /// Accept a pending offer; ignored when none is pending
    pub fn accept_draw(&mut self, outbound: &mut impl Outbound) -> bool {
        if !self.draw_offered {
            return false;
        }
        self.draw_offered = false;
        outbound.send(ClientAction::AcceptDraw);
        true
    }

    pub fn resign(&mut self, outbound: &mut impl Outbound) {
        outbound.send(ClientAction::Resign);
    }

    pub fn exit(&mut self, outbound: &mut impl Outbound) {
        outbound.send(ClientAction::Exit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_codes() {
        assert_eq!(MatchOutcome::try_from(1u8), Ok(MatchOutcome::Checkmate));
        assert_eq!(MatchOutcome::try_from(11u8), Ok(MatchOutcome::Timeout));
        assert_eq!(MatchOutcome::try_from(14u8), Ok(MatchOutcome::Abandoned));
        assert_eq!(
            MatchOutcome::try_from(0u8),
            Err(GameError::InvalidOutcome { code: 0 })
        );
        assert!(MatchOutcome::try_from(15u8).is_err());

        for outcome in MatchOutcome::ALL {
            assert_eq!(MatchOutcome::try_from(outcome.code()), Ok(outcome));
        }
    }

    #[test]
    fn test_outcome_serde_uses_codes() {
        let json = serde_json::to_string(&MatchOutcome::Resignation).unwrap();
        assert_eq!(json, "12");
        let outcome: MatchOutcome = serde_json::from_str("13").unwrap();
        assert_eq!(outcome, MatchOutcome::Agreement);
    }

    #[test]
    fn test_record_result_once_per_round() {
        //! A second report for the same round only refreshes the score
        let mut session = MatchSession::default();
        session.begin_round(1, 3);

        let first = RoundResult {
            outcome: MatchOutcome::Checkmate,
            winner: Some(PieceColor::White),
        };
        assert!(session.record_result(first, Some([0.0, 1.0])));

        let second = RoundResult {
            outcome: MatchOutcome::Timeout,
            winner: Some(PieceColor::Black),
        };
        assert!(!session.record_result(second, None));
        assert_eq!(session.last_result, Some(first));
        assert_eq!(session.score_of(PieceColor::White), Some(1.0));
        assert_eq!(session.score_of(PieceColor::Black), Some(0.0));

        session.begin_round(2, 3);
        assert_eq!(session.last_result, None);
        assert_eq!(session.match_score, Some([0.0, 1.0]), "score carries over");
    }

    #[test]
    fn test_draw_offer_flow() {
        let mut session = MatchSession::default();
        let mut sent = Vec::new();

        assert!(!session.accept_draw(&mut sent), "nothing to accept yet");
        assert!(sent.is_empty());

        session.receive_draw_offer();
        assert!(session.draw_offered);
        assert!(session.accept_draw(&mut sent));
        assert!(!session.draw_offered);
        assert_eq!(sent, vec![ClientAction::AcceptDraw]);
    }

    #[test]
    fn test_player_actions_are_emitted() {
        let mut session = MatchSession::default();
        let mut sent = Vec::new();
        session.offer_draw(&mut sent);
        session.resign(&mut sent);
        session.exit(&mut sent);
        assert_eq!(
            sent,
            vec![
                ClientAction::OfferDraw,
                ClientAction::Resign,
                ClientAction::Exit
            ]
        );
    }

    #[test]
    fn test_result_summary() {
        let win = RoundResult {
            outcome: MatchOutcome::Checkmate,
            winner: Some(PieceColor::Black),
        };
        assert_eq!(win.summary(), "Black wins by checkmate");
        let draw = RoundResult {
            outcome: MatchOutcome::Stalemate,
            winner: None,
        };
        assert_eq!(draw.summary(), "Draw by stalemate");
    }
}
