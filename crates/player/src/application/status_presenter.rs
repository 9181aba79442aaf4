//! Connection-status presenter
//!
//! Turns transport state transitions into the indicator the viewer sees.
//! The transport is never treated as a data source beyond this.

use crate::infrastructure::messaging::{ConnectionState, ConnectionStatus};
use crate::ports::outbound::{StatusIndicator, StatusSink};

pub struct ConnectionStatusPresenter {
    sink: Box<dyn StatusSink>,
    current: Option<StatusIndicator>,
}

impl ConnectionStatusPresenter {
    pub fn new(sink: Box<dyn StatusSink>) -> Self {
        Self {
            sink,
            current: None,
        }
    }

    /// Show the indicator for `status` unless it is already showing.
    ///
    /// Returns the indicator when the display changed.
    pub fn on_status(&mut self, status: ConnectionStatus) -> Option<StatusIndicator> {
        let indicator = indicator_for(status);
        if self.current == Some(indicator) {
            return None;
        }

        tracing::debug!(
            state = %status.state,
            failed_attempts = status.failed_attempts,
            indicator = %indicator,
            "Connection indicator changed"
        );
        self.current = Some(indicator);
        self.sink.show_status(indicator);
        Some(indicator)
    }

    pub fn current(&self) -> Option<StatusIndicator> {
        self.current
    }
}

/// Indicator for a transport status.
///
/// While reconnecting, the indicator counts the attempt about to be made.
pub fn indicator_for(status: ConnectionStatus) -> StatusIndicator {
    match status.state {
        ConnectionState::Connecting => StatusIndicator::Connecting,
        ConnectionState::Connected => StatusIndicator::Online,
        ConnectionState::Reconnecting => StatusIndicator::Reconnecting {
            attempt: (status.failed_attempts + 1).min(status.max_attempts),
            max_attempts: status.max_attempts,
        },
        ConnectionState::Disconnected => StatusIndicator::Offline,
        ConnectionState::Failed => StatusIndicator::Failed {
            attempts: status.failed_attempts,
        },
    }
}
