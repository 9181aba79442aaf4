//! Outbound ports - Interfaces for external collaborators
//!
//! These ports define the contracts that adapters must implement, allowing
//! the core to drive a renderer or a status display without depending on
//! concrete implementations.

pub mod clock_port;
pub mod renderer_port;
pub mod status_port;

pub use clock_port::ClockPort;
pub use renderer_port::SceneRenderer;
pub use status_port::{StatusIndicator, StatusSink};

#[cfg(any(test, feature = "testing"))]
pub use renderer_port::MockSceneRenderer;
#[cfg(any(test, feature = "testing"))]
pub use status_port::MockStatusSink;
