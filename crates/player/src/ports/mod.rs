//! Player port definitions.
//!
//! Ports are the seams between the synchronization core and its external
//! collaborators: the scene renderer, the connection status display and the
//! clock. Infrastructure provides the concrete adapters.

pub mod outbound;
