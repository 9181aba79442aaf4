//! PixelTales Domain - the scene vocabulary shared by every layer.
//!
//! Pure data: no I/O, no async, no clocks. Time-dependent helpers take the
//! current Unix time as an argument.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    parse_hex_color, speaking_time_for, CharacterState, Message, SceneSnapshot,
    BASE_SPEAKING_TIME_SECS, DEFAULT_CHARACTER_COLOR, MAX_CONVERSATION_RATING,
    SPEAKING_TIME_PER_CHAR_SECS,
};
pub use error::DomainError;
pub use ids::CharacterId;
pub use value_objects::{CharacterAction, Direction, Position, ThinkingKind};
