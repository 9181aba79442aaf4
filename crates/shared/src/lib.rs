//! PixelTales Protocol - Shared types for server and player communication
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Snapshots only** - the server never sends deltas

pub mod error;
pub mod messages;

pub use error::ProtocolError;
pub use messages::{encode_client_message, parse_server_message, ClientMessage, ServerMessage};

// Re-export the snapshot vocabulary so transport code needs a single import
pub use pixeltales_domain::{CharacterState, Message, SceneSnapshot};
