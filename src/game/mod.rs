//! Game module - match state, move handling and the ECS plugin
//!
//! # Layout
//!
//! - [`types`], [`board`], [`notation`] - coordinates, snapshots and move text
//! - [`classifier`] - special-move predicates and snapshot planning
//! - [`reconciler`] - [`MatchBoard`], the local copy kept in step with the server
//! - [`clock`] - [`MatchClock`], per-side countdowns with server resync
//! - [`session`] - round series, outcomes and player actions
//! - [`plugin`], [`systems`], [`system_sets`], [`events`] - ECS wiring

pub mod board;
pub mod classifier;
pub mod clock;
pub mod error;
pub mod events;
pub mod notation;
pub mod plugin;
pub mod reconciler;
pub mod session;
pub mod system_sets;
pub mod systems;
pub mod types;

pub use board::{Board, Orientation};
pub use clock::{ClockPair, ClockState, MatchClock};
pub use error::{GameError, GameResult};
pub use events::{BoardCommitted, BoardResized, PlayerCommand, SquareInput};
pub use notation::{format_clock, Move};
pub use plugin::MatchPlugin;
pub use reconciler::{AppliedMove, LegalMoveSet, MatchBoard, MoveSource};
pub use session::{MatchOutcome, MatchSession, Outbound, RoundResult};
pub use system_sets::MatchSystems;
pub use systems::{teardown_match, ClockTicker};
pub use types::{File, Piece, PieceColor, PieceKind, Rank, Square};
