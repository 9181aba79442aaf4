//! Connection lifecycle state.
//!
//! The transport task owns the connection; everything else reads its state
//! through a [`ConnectionStateObserver`] or receives [`ConnectionStatus`]
//! transitions as channel events.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Coarse connection state, cheap to share across tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected and not trying (initial, or after `disconnect()`)
    Disconnected,
    /// First connection attempt in flight
    Connecting,
    /// Socket open and receiving snapshots
    Connected,
    /// Connection lost or refused; another attempt is scheduled
    Reconnecting,
    /// Retries exhausted; terminal until an explicit reconnect
    Failed,
}

impl ConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Reconnecting => 3,
            ConnectionState::Failed => 4,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A state transition together with the retry counter at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Failed attempts since the last successful connection
    pub failed_attempts: u32,
    pub max_attempts: u32,
}

impl ConnectionStatus {
    pub fn new(state: ConnectionState, failed_attempts: u32, max_attempts: u32) -> Self {
        Self {
            state,
            failed_attempts,
            max_attempts,
        }
    }
}

/// Read-only view of the transport's connection state.
///
/// Clones share the same underlying state.
#[derive(Clone)]
pub struct ConnectionStateObserver {
    state: Arc<AtomicU8>,
}

impl ConnectionStateObserver {
    /// Create a new observer from a shared state Arc.
    pub fn new(state: Arc<AtomicU8>) -> Self {
        Self { state }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

impl fmt::Debug for ConnectionStateObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStateObserver")
            .field("state", &self.state())
            .finish()
    }
}

/// Store a new state, returning the previous one.
pub fn set_connection_state(state_ref: &AtomicU8, new_state: ConnectionState) -> ConnectionState {
    ConnectionState::from_u8(state_ref.swap(new_state.to_u8(), Ordering::SeqCst))
}
