//! Transport defaults and the resolved transport configuration.

use std::time::Duration;

use url::Url;

pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

// Reconnection defaults
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_DELAY_MS: u64 = 2_000;
pub const CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const HEARTBEAT_INTERVAL_MS: u64 = 25_000;

/// Everything the transport channel needs to know about its endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub url: Url,
    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
    /// `None` disables keep-alive heartbeats
    pub heartbeat_interval: Option<Duration>,
}

impl TransportConfig {
    /// Config for `url` with the default retry and heartbeat settings
    pub fn new(url: Url) -> Self {
        Self {
            url,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: Duration::from_millis(RECONNECT_DELAY_MS),
            connect_timeout: Duration::from_millis(CONNECT_TIMEOUT_MS),
            heartbeat_interval: Some(Duration::from_millis(HEARTBEAT_INTERVAL_MS)),
        }
    }
}
