//! Runtime-free reconnection logic for the transport channel.
//!
//! The socket task reports what happened (connect failed, server closed,
//! connection dropped, snapshot received) and this state machine decides
//! whether and when to try again. No tokio in here.

use std::time::Duration;

use super::shared::TransportConfig;

/// Fixed-delay bounded retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl From<&TransportConfig> for RetryPolicy {
    fn from(config: &TransportConfig) -> Self {
        Self::new(config.max_reconnect_attempts, config.reconnect_delay)
    }
}

/// What the socket task should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Reconnect right away (graceful server reset)
    RetryNow,
    /// Reconnect after the fixed delay
    RetryAfter(Duration),
    /// Stop; the channel is now terminally failed
    GiveUp,
}

/// Attempt counter plus the server-close bookkeeping.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    failures: u32,
    /// An uncounted immediate retry was already spent and no snapshot has
    /// arrived since
    immediate_retry_spent: bool,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: 0,
            immediate_retry_spent: false,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.failures >= self.policy.max_attempts
    }

    /// A connection was established; the attempt counter starts over.
    pub fn on_connected(&mut self) {
        self.failures = 0;
    }

    /// Real data arrived, so the connection is healthy again.
    pub fn on_snapshot(&mut self) {
        self.immediate_retry_spent = false;
    }

    /// A connect attempt failed or timed out. Counts against the maximum.
    pub fn on_connect_error(&mut self) -> RetryDecision {
        self.failures = self.failures.saturating_add(1);
        if self.is_exhausted() {
            RetryDecision::GiveUp
        } else {
            RetryDecision::RetryAfter(self.policy.delay)
        }
    }

    /// The server closed an established connection on purpose.
    ///
    /// The first such close gets one immediate, uncounted retry. A second
    /// close with no snapshot in between is treated like instability.
    pub fn on_server_close(&mut self) -> RetryDecision {
        if self.immediate_retry_spent {
            RetryDecision::RetryAfter(self.policy.delay)
        } else {
            self.immediate_retry_spent = true;
            RetryDecision::RetryNow
        }
    }

    /// An established connection dropped without a close handshake.
    pub fn on_connection_lost(&mut self) -> RetryDecision {
        RetryDecision::RetryAfter(self.policy.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_secs(2))
    }

    #[test]
    fn five_consecutive_connect_errors_exhaust_retries() {
        let mut retry = RetryState::new(policy());

        for attempt in 1..=4 {
            assert_eq!(
                retry.on_connect_error(),
                RetryDecision::RetryAfter(Duration::from_secs(2))
            );
            assert_eq!(retry.failures(), attempt);
        }

        assert_eq!(retry.on_connect_error(), RetryDecision::GiveUp);
        assert!(retry.is_exhausted());
    }

    #[test]
    fn successful_connect_resets_counter() {
        let mut retry = RetryState::new(policy());
        retry.on_connect_error();
        retry.on_connect_error();
        retry.on_connected();

        assert_eq!(retry.failures(), 0);
        for _ in 0..4 {
            assert!(matches!(retry.on_connect_error(), RetryDecision::RetryAfter(_)));
        }
    }

    #[test]
    fn server_close_retries_immediately_without_counting() {
        let mut retry = RetryState::new(policy());
        retry.on_connect_error();

        assert_eq!(retry.on_server_close(), RetryDecision::RetryNow);
        assert_eq!(retry.failures(), 1);
    }

    #[test]
    fn repeated_server_close_without_data_waits() {
        let mut retry = RetryState::new(policy());

        assert_eq!(retry.on_server_close(), RetryDecision::RetryNow);
        retry.on_connected();
        assert_eq!(
            retry.on_server_close(),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );

        retry.on_connected();
        retry.on_snapshot();
        assert_eq!(retry.on_server_close(), RetryDecision::RetryNow);
    }

    #[test]
    fn connection_loss_waits_without_counting() {
        let mut retry = RetryState::new(policy());
        assert_eq!(
            retry.on_connection_lost(),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(retry.failures(), 0);
    }

    #[test]
    fn zero_max_gives_up_on_first_failure() {
        let mut retry = RetryState::new(RetryPolicy::new(0, Duration::ZERO));
        assert_eq!(retry.on_connect_error(), RetryDecision::GiveUp);
    }
}
