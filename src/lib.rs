//! duelchess - client core for a networked, two-player chess match
//!
//! The server is authoritative for legality, outcomes and time. The client
//! keeps a local board and two clocks consistent with it: local moves are
//! gated by the server's legal-move list and applied optimistically, remote
//! updates are replayed through the same move classifier, and each new snapshot
//! is committed to the view after a short slide animation.
//!
//! # Modules
//!
//! - [`game`] - board, clocks, session and the [`game::MatchPlugin`]
//! - [`networking`] - wire protocol and the channel bridge to the transport
//! - [`rendering`] - square anchors, move animation and piece entities
//! - [`core`] - settings and their persistence

pub mod core;
pub mod game;
pub mod networking;
pub mod rendering;
