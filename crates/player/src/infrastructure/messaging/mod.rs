//! Connection state shared between the transport task and its observers.

pub mod connection;

pub use connection::{
    set_connection_state, ConnectionState, ConnectionStateObserver, ConnectionStatus,
};
