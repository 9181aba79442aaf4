//! PixelTales Player - live scene client core.
//!
//! Keeps a local view of a server-driven conversation scene in sync over a
//! WebSocket, derives timed speech effects from each snapshot, and lets the
//! viewer scrub back through the message log without losing the live feed.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod state;

pub use application::{InputEvent, SceneSession};
pub use config::{ConfigError, PlayerConfig};
pub use infrastructure::websocket::{ChannelEvent, DisconnectReason, TransportChannel};
