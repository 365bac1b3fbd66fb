//! Wire protocol between the match client and the game server
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Colors travel as integers (`0` black, `1` white), outcomes as the server's
//! termination codes, and times as milliseconds which the server may send as
//! floats.

use super::error::{NetworkError, NetworkResult};
use crate::game::session::MatchOutcome;
use crate::game::types::PieceColor;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

/// Events pushed by the server
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A round begins; seats may have swapped since the last one
    Start(RoundStart),
    /// Authoritative position update, sent to both players after every move
    Move(MoveUpdate),
    /// Clock-only resynchronization
    #[serde(alias = "time")]
    ClockSync(ClockSync),
    /// The opponent offers a draw
    DrawOffer,
    /// The series is over
    MatchEnded(MatchEnded),
}

impl ServerEvent {
    pub fn decode(frame: &str) -> NetworkResult<Self> {
        serde_json::from_str(frame).map_err(NetworkError::Decode)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Start(_) => "start",
            ServerEvent::Move(_) => "move",
            ServerEvent::ClockSync(_) => "clockSync",
            ServerEvent::DrawOffer => "drawOffer",
            ServerEvent::MatchEnded(_) => "matchEnded",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundStart {
    pub colour: PieceColor,
    /// Initial time per side, milliseconds
    pub time_remaining: f64,
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub total_rounds: u32,
}

impl RoundStart {
    pub fn time_remaining_ms(&self) -> u64 {
        to_millis(self.time_remaining).unwrap_or(0)
    }
}

/// Which rook moved alongside a castling king
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    #[serde(rename = "K")]
    Kingside,
    #[serde(rename = "Q")]
    Queenside,
}

/// Payload of a `move` event
///
/// Every field is optional: resignations, flags and abandonments arrive as
/// updates carrying only `outcome`, `winner` and sometimes `matchScore`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MoveUpdate {
    /// Side to move after this update
    pub turn: Option<PieceColor>,
    /// The move just played, in notation
    #[serde(rename = "move")]
    pub mv: Option<String>,
    pub castles: Option<CastleSide>,
    pub en_passant: Option<bool>,
    pub is_check: Option<bool>,
    /// Legal moves for the new side to move
    pub legal_moves: Option<Vec<String>>,
    pub move_stack: Option<Vec<String>>,
    pub outcome: Option<MatchOutcome>,
    pub winner: Option<PieceColor>,
    #[serde(deserialize_with = "lenient_score")]
    pub match_score: Option<[f32; 2]>,
    pub time_remaining_white: Option<f64>,
    pub time_remaining_black: Option<f64>,
    /// Server send time, epoch milliseconds
    pub timestamp: Option<f64>,
}

impl MoveUpdate {
    pub fn time_remaining_ms(&self, color: PieceColor) -> Option<u64> {
        match color {
            PieceColor::White => self.time_remaining_white.and_then(to_millis),
            PieceColor::Black => self.time_remaining_black.and_then(to_millis),
        }
    }

    /// Milliseconds between the server stamping the update and `now_epoch_ms`
    pub fn transit_lag(&self, now_epoch_ms: f64) -> u64 {
        self.timestamp
            .and_then(|sent| to_millis(now_epoch_ms - sent))
            .unwrap_or(0)
    }
}

/// Payload of a `clockSync` (or legacy `time`) event
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ClockSync {
    #[serde(alias = "timeRemainingWhite")]
    pub white: Option<f64>,
    #[serde(alias = "timeRemainingBlack")]
    pub black: Option<f64>,
}

impl ClockSync {
    pub fn white_ms(&self) -> Option<u64> {
        self.white.and_then(to_millis)
    }

    pub fn black_ms(&self) -> Option<u64> {
        self.black.and_then(to_millis)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchEnded {
    /// `None` when the series is drawn
    pub overall_winner: Option<PieceColor>,
}

/// Actions the client sends to the server
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientAction {
    Move(String),
    /// Claim that the given color ran out of time
    Flag(PieceColor),
    OfferDraw,
    AcceptDraw,
    Resign,
    Exit,
}

impl ClientAction {
    pub fn encode(&self) -> NetworkResult<String> {
        serde_json::to_string(self).map_err(NetworkError::Encode)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientAction::Move(_) => "move",
            ClientAction::Flag(_) => "flag",
            ClientAction::OfferDraw => "offerDraw",
            ClientAction::AcceptDraw => "acceptDraw",
            ClientAction::Resign => "resign",
            ClientAction::Exit => "exit",
        }
    }
}

/// Non-negative whole milliseconds, `None` for NaN or infinities
fn to_millis(value: f64) -> Option<u64> {
    value.is_finite().then(|| value.max(0.0).round() as u64)
}

/// Accept `[black, white]` pairs and drop any other shape
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<[f32; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
