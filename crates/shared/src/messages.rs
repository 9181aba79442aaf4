//! WebSocket message types for server-player communication
//!
//! The scene server pushes one message that matters: the full scene state,
//! sent whenever any character action, message or scene field changes.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Removing variants requires major version bump
//! - Renaming variants is a breaking change
//! - Unknown enum variants deserialize to `Unknown` variant for forward compatibility

use serde::{Deserialize, Serialize};

use pixeltales_domain::SceneSnapshot;

use crate::error::ProtocolError;

// =============================================================================
// Client Messages (Player → Server)
// =============================================================================

/// Messages from client (Player) to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat ping
    Heartbeat,

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages (Server → Player)
// =============================================================================

/// Messages from server to client (Player)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Complete authoritative scene state
    SceneState { state: Box<SceneSnapshot> },

    /// Heartbeat response
    Pong,

    /// Unknown message type for forward compatibility
    ///
    /// Lets older players ignore message kinds added to the server later.
    #[serde(other)]
    Unknown,
}

/// Decode a text frame from the server.
pub fn parse_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

/// Encode a client message into a text frame.
pub fn encode_client_message(message: &ClientMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}
