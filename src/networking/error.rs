//! Error types for networking module

/// Errors raised while moving frames between the transport and the match
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Inbound frame was not a known event envelope
    #[error("Malformed server frame: {0}")]
    Decode(#[source] serde_json::Error),

    /// Outbound action could not be serialized
    #[error("Failed to encode client action: {0}")]
    Encode(#[source] serde_json::Error),

    /// The transport side of the link has gone away
    #[error("Match link disconnected")]
    Disconnected,
}

/// Result type alias for networking operations
pub type NetworkResult<T> = Result<T, NetworkError>;
