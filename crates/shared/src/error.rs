use thiserror::Error;

/// Failure to translate between wire frames and protocol types.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Failed to decode server message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode client message: {0}")]
    Encode(#[source] serde_json::Error),
}
