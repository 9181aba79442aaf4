//! Application layer: the session that wires channel, state and renderer,
//! plus the input vocabulary and the connection-status presenter.

pub mod input;
pub mod session;
pub mod status_presenter;

pub use input::{parse_key, InputEvent, KeyCommand};
pub use session::SceneSession;
pub use status_presenter::{indicator_for, ConnectionStatusPresenter};
