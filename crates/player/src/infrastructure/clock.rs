//! Clock implementations.

use std::time::Instant;

#[cfg(any(test, feature = "testing"))]
use std::time::Duration;

use chrono::Utc;

use crate::ports::outbound::ClockPort;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_unix(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Manually advanced clock for testing.
#[cfg(any(test, feature = "testing"))]
pub struct ManualClock {
    origin: Instant,
    origin_unix: f64,
    offset: std::sync::Mutex<Duration>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualClock {
    pub fn new(origin_unix: f64) -> Self {
        Self {
            origin: Instant::now(),
            origin_unix,
            offset: std::sync::Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }

    fn offset(&self) -> Duration {
        self.offset.lock().map(|offset| *offset).unwrap_or_default()
    }
}

#[cfg(any(test, feature = "testing"))]
impl ClockPort for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset()
    }

    fn now_unix(&self) -> f64 {
        self.origin_unix + self.offset().as_secs_f64()
    }
}
