//! Scene fixtures shared by unit and integration tests.

use pixeltales_domain::{CharacterAction, CharacterState, Message, SceneSnapshot};

/// A character with a fixed color, named after its id.
pub fn character(id: &str, action: CharacterAction) -> CharacterState {
    CharacterState::new(id, id.to_uppercase(), "#3366cc", action, 0.0)
}

/// A message with an explicit speaking time.
pub fn line(speaker: &str, content: &str, unix_timestamp: f64, speaking_secs: f64) -> Message {
    let mut message = Message::spoken(speaker, content, unix_timestamp);
    message.calculated_speaking_time = speaking_secs;
    message
}

/// A snapshot with the given roster and log.
pub fn scene(characters: Vec<CharacterState>, messages: Vec<Message>) -> SceneSnapshot {
    SceneSnapshot {
        scene_id: 1,
        scene_config_id: 1,
        characters: characters
            .into_iter()
            .map(|character| (character.id.clone(), character))
            .collect(),
        messages,
        conversation_active: true,
        ..Default::default()
    }
}

/// Wire frame carrying `snapshot`, as the server would send it.
pub fn scene_state_frame(snapshot: &SceneSnapshot) -> String {
    serde_json::json!({ "type": "scene_state", "state": snapshot }).to_string()
}
