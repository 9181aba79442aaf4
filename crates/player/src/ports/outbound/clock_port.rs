//! Clock Port - time source for effect timers
//!
//! Effect countdowns run on a monotonic clock; comparisons against server
//! timestamps (end-request validity, conversation duration) use wall-clock
//! Unix seconds. Both come from the same port so tests can drive them.

use std::time::Instant;

pub trait ClockPort: Send + Sync {
    /// Monotonic instant used for bubble countdowns
    fn now(&self) -> Instant;

    /// Wall-clock Unix time in seconds
    fn now_unix(&self) -> f64;
}
