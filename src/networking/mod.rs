//! Server protocol and the channel bridge that carries it

pub mod channel;
pub mod error;
pub mod protocol;

pub use channel::{MatchLink, TransportEnds};
pub use error::{NetworkError, NetworkResult};
pub use protocol::{ClientAction, ServerEvent};
