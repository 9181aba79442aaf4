//! Entities carried inside a scene snapshot

mod character;
mod message;
mod scene;

pub use character::{parse_hex_color, CharacterState, DEFAULT_CHARACTER_COLOR};
pub use message::{
    speaking_time_for, Message, BASE_SPEAKING_TIME_SECS, MAX_CONVERSATION_RATING,
    SPEAKING_TIME_PER_CHAR_SECS,
};
pub use scene::SceneSnapshot;
