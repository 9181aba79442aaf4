//! Transport-layer errors.
//!
//! None of these escape the transport task as values: they are logged and
//! reported to the session as `ChannelEvent` text. Undecodable server frames
//! are logged as `Protocol` and otherwise skipped.

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use pixeltales_shared::ProtocolError;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("connect attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("websocket error: {0}")]
    Socket(#[source] tungstenite::Error),

    #[error("connection closed without a close frame")]
    StreamEnded,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_names_the_limit() {
        let err = TransportError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "connect attempt timed out after 10s");
    }

    #[test]
    fn undecodable_frame_keeps_protocol_detail() {
        let err = TransportError::from(
            pixeltales_shared::parse_server_message("not json").unwrap_err(),
        );
        assert!(matches!(err, TransportError::Protocol(_)));
        assert!(!err.to_string().is_empty());
    }
}
