//! Connection Status Port - where the connection indicator is shown

use std::fmt;

/// What the connection indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    /// First connection attempt in flight
    Connecting,
    /// Connected and receiving scene updates
    Online,
    /// Connection lost or refused; automatic retry pending
    Reconnecting { attempt: u32, max_attempts: u32 },
    /// Disconnected on request
    Offline,
    /// Retries exhausted; an explicit reconnect is required
    Failed { attempts: u32 },
}

impl StatusIndicator {
    /// Whether the indicator should stay on screen until acted on
    pub fn is_persistent(&self) -> bool {
        matches!(self, StatusIndicator::Failed { .. })
    }
}

impl fmt::Display for StatusIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusIndicator::Connecting => f.write_str("Connecting..."),
            StatusIndicator::Online => f.write_str("Live"),
            StatusIndicator::Reconnecting {
                attempt,
                max_attempts,
            } => write!(f, "Reconnecting ({attempt}/{max_attempts})..."),
            StatusIndicator::Offline => f.write_str("Offline"),
            StatusIndicator::Failed { attempts } => {
                write!(f, "Disconnected after {attempts} failed attempts")
            }
        }
    }
}

/// Port for the connection status display
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StatusSink: Send {
    fn show_status(&mut self, indicator: StatusIndicator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failure_is_persistent() {
        assert!(StatusIndicator::Failed { attempts: 5 }.is_persistent());
        assert!(!StatusIndicator::Offline.is_persistent());
        assert!(!StatusIndicator::Reconnecting {
            attempt: 1,
            max_attempts: 5
        }
        .is_persistent());
    }

    #[test]
    fn reconnecting_label_shows_progress() {
        let indicator = StatusIndicator::Reconnecting {
            attempt: 2,
            max_attempts: 5,
        };
        assert_eq!(indicator.to_string(), "Reconnecting (2/5)...");
    }
}
