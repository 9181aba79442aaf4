//! Player configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `PIXELTALES_WS_URL` (fallback `ENGINE_WS_URL`) | `ws://localhost:8000/ws` |
//! | `PIXELTALES_MAX_RECONNECT_ATTEMPTS` | `5` |
//! | `PIXELTALES_RECONNECT_DELAY_MS` | `2000` |
//! | `PIXELTALES_CONNECT_TIMEOUT_MS` | `10000` |
//! | `PIXELTALES_HEARTBEAT_INTERVAL_MS` | `25000` (0 disables) |
//! | `PIXELTALES_EFFECT_TICK_MS` | `100` |
//! | `PIXELTALES_EFFECT_RESTART` | `preserve` (or `recreate`) |
//! | `PIXELTALES_DISCARD_STALE` | `false` |
//! | `PIXELTALES_NAV_FEEDBACK_MS` | `400` |

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::infrastructure::websocket::{
    TransportConfig, CONNECT_TIMEOUT_MS, DEFAULT_WS_URL, HEARTBEAT_INTERVAL_MS,
    MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_MS,
};
use crate::state::EffectRestartPolicy;

pub const ENV_WS_URL: &str = "PIXELTALES_WS_URL";
pub const ENV_WS_URL_FALLBACK: &str = "ENGINE_WS_URL";
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "PIXELTALES_MAX_RECONNECT_ATTEMPTS";
pub const ENV_RECONNECT_DELAY_MS: &str = "PIXELTALES_RECONNECT_DELAY_MS";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "PIXELTALES_CONNECT_TIMEOUT_MS";
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "PIXELTALES_HEARTBEAT_INTERVAL_MS";
pub const ENV_EFFECT_TICK_MS: &str = "PIXELTALES_EFFECT_TICK_MS";
pub const ENV_EFFECT_RESTART: &str = "PIXELTALES_EFFECT_RESTART";
pub const ENV_DISCARD_STALE: &str = "PIXELTALES_DISCARD_STALE";
pub const ENV_NAV_FEEDBACK_MS: &str = "PIXELTALES_NAV_FEEDBACK_MS";

const EFFECT_TICK_MS: u64 = 100;
const NAV_FEEDBACK_MS: u64 = 400;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid URL {value:?}: {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var}: unsupported scheme {scheme:?}, expected ws or wss")]
    UnsupportedScheme { var: &'static str, scheme: String },

    #[error("{var}: expected {expected}, got {value:?}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Fully resolved player settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub transport: TransportConfig,
    /// Interval of the effect countdown tick
    pub effect_tick: Duration,
    pub effect_restart: EffectRestartPolicy,
    /// Drop versioned snapshots not newer than the last one applied
    pub discard_stale: bool,
    /// How long invalid-navigation feedback stays visible
    pub nav_feedback: Duration,
}

impl PlayerConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through `lookup`; unset or blank variables take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let (url_var, raw_url) = match get(ENV_WS_URL) {
            Some(value) => (ENV_WS_URL, value),
            None => match get(ENV_WS_URL_FALLBACK) {
                Some(value) => (ENV_WS_URL_FALLBACK, value),
                None => (ENV_WS_URL, DEFAULT_WS_URL.to_string()),
            },
        };
        let url = parse_ws_url(url_var, &raw_url)?;

        let max_reconnect_attempts = parse_number(
            ENV_MAX_RECONNECT_ATTEMPTS,
            get(ENV_MAX_RECONNECT_ATTEMPTS),
            u64::from(MAX_RECONNECT_ATTEMPTS),
            1,
        )?;
        let max_reconnect_attempts =
            u32::try_from(max_reconnect_attempts).map_err(|_| ConfigError::InvalidValue {
                var: ENV_MAX_RECONNECT_ATTEMPTS,
                value: max_reconnect_attempts.to_string(),
                expected: "an attempt count that fits in 32 bits",
            })?;

        let reconnect_delay = millis(parse_number(
            ENV_RECONNECT_DELAY_MS,
            get(ENV_RECONNECT_DELAY_MS),
            RECONNECT_DELAY_MS,
            0,
        )?);
        let connect_timeout = millis(parse_number(
            ENV_CONNECT_TIMEOUT_MS,
            get(ENV_CONNECT_TIMEOUT_MS),
            CONNECT_TIMEOUT_MS,
            1,
        )?);
        let heartbeat_ms = parse_number(
            ENV_HEARTBEAT_INTERVAL_MS,
            get(ENV_HEARTBEAT_INTERVAL_MS),
            HEARTBEAT_INTERVAL_MS,
            0,
        )?;
        let heartbeat_interval = (heartbeat_ms > 0).then(|| millis(heartbeat_ms));

        let effect_tick = millis(parse_number(
            ENV_EFFECT_TICK_MS,
            get(ENV_EFFECT_TICK_MS),
            EFFECT_TICK_MS,
            1,
        )?);

        let effect_restart = match get(ENV_EFFECT_RESTART) {
            None => EffectRestartPolicy::default(),
            Some(value) => {
                value
                    .parse::<EffectRestartPolicy>()
                    .map_err(|_| ConfigError::InvalidValue {
                        var: ENV_EFFECT_RESTART,
                        value,
                        expected: "preserve or recreate",
                    })?
            }
        };

        let discard_stale = match get(ENV_DISCARD_STALE) {
            None => false,
            Some(value) => parse_bool(ENV_DISCARD_STALE, value)?,
        };

        let nav_feedback = millis(parse_number(
            ENV_NAV_FEEDBACK_MS,
            get(ENV_NAV_FEEDBACK_MS),
            NAV_FEEDBACK_MS,
            0,
        )?);

        Ok(Self {
            transport: TransportConfig {
                url,
                max_reconnect_attempts,
                reconnect_delay,
                connect_timeout,
                heartbeat_interval,
            },
            effect_tick,
            effect_restart,
            discard_stale,
            nav_feedback,
        })
    }
}

/// Parse and check a WebSocket endpoint.
pub fn parse_ws_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            var,
            scheme: other.to_string(),
        }),
    }
}

fn parse_number(
    var: &'static str,
    value: Option<String>,
    default: u64,
    min: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.parse::<u64>() {
        Ok(n) if n >= min => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            var,
            value,
            expected: if min == 0 {
                "a non-negative integer"
            } else {
                "a positive integer"
            },
        }),
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value,
            expected: "true or false",
        }),
    }
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
