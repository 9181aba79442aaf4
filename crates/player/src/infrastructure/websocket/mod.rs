//! WebSocket transport to the scene server
//!
//! - `core`: runtime-free retry state machine
//! - `client`: tokio-tungstenite channel that owns the socket task
//! - `shared`: defaults and the resolved transport configuration

mod client;
mod core;
mod shared;

pub use client::{ChannelEvent, DisconnectReason, TransportChannel};
pub use core::{RetryDecision, RetryPolicy, RetryState};
pub use shared::{
    TransportConfig, CONNECT_TIMEOUT_MS, DEFAULT_WS_URL, HEARTBEAT_INTERVAL_MS,
    MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_MS,
};
