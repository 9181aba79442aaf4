//! Infrastructure adapters: the WebSocket transport, clocks and the
//! headless renderer used by the binary.

pub mod clock;
pub mod error;
pub mod headless;
pub mod messaging;
pub mod websocket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::TransportError;
pub use messaging::{ConnectionState, ConnectionStateObserver, ConnectionStatus};
