//! Character state as reported by the server
//!
//! A `CharacterState` is replaced in full on every snapshot; the client never
//! patches individual fields.

use serde::{Deserialize, Serialize};

use crate::value_objects::{CharacterAction, Direction, Position};
use crate::CharacterId;

/// Fallback sprite tint when the configured color is not `#RRGGBB`.
pub const DEFAULT_CHARACTER_COLOR: &str = "#808080";

/// Complete state of one character in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    pub id: CharacterId,
    pub name: String,
    /// Hex color in `#RRGGBB` form
    pub color: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub visual: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub direction: Direction,
    /// Free-form mood description
    #[serde(default = "default_mood")]
    pub current_mood: String,
    pub action: CharacterAction,
    /// Unix timestamp (seconds) at which `action` started server-side
    pub action_started_at: f64,
    /// Seconds the server expects the action to last
    #[serde(default)]
    pub action_estimated_duration: Option<f64>,
    #[serde(default)]
    pub end_conversation_requested: bool,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub end_conversation_requested_at: Option<f64>,
    /// Seconds
    #[serde(default)]
    pub end_conversation_requested_validity_duration: Option<f64>,
}

fn default_mood() -> String {
    "neutral".to_string()
}

impl CharacterState {
    /// Create a character in the given action, all optional fields empty.
    pub fn new(
        id: impl Into<CharacterId>,
        name: impl Into<String>,
        color: impl Into<String>,
        action: CharacterAction,
        action_started_at: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            role: String::new(),
            visual: String::new(),
            position: Position::default(),
            direction: Direction::default(),
            current_mood: default_mood(),
            action,
            action_started_at,
            action_estimated_duration: None,
            end_conversation_requested: false,
            end_conversation_requested_at: None,
            end_conversation_requested_validity_duration: None,
        }
    }

    /// Parse `color` into RGB components. `None` if it is not `#RRGGBB`.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }

    /// The color to tint effects with, falling back to a neutral grey.
    pub fn display_color(&self) -> &str {
        if self.rgb().is_some() {
            &self.color
        } else {
            DEFAULT_CHARACTER_COLOR
        }
    }

    /// Whether this character's request to end the conversation still counts.
    ///
    /// A request without a validity window stays active for as long as the
    /// flag is set.
    pub fn end_request_active(&self, now_unix: f64) -> bool {
        if !self.end_conversation_requested {
            return false;
        }
        match (
            self.end_conversation_requested_at,
            self.end_conversation_requested_validity_duration,
        ) {
            (Some(requested_at), Some(validity)) => now_unix - requested_at <= validity,
            _ => true,
        }
    }

    /// Seconds the current action has been running according to the server clock.
    pub fn action_elapsed(&self, now_unix: f64) -> f64 {
        (now_unix - self.action_started_at).max(0.0)
    }
}

/// Parse `#RRGGBB` into its components.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> CharacterState {
        CharacterState::new("bob", "Bob", "#FF8800", CharacterAction::Idle, 100.0)
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#FF8800"), Some((255, 136, 0)));
        assert_eq!(parse_hex_color("#00ff00"), Some((0, 255, 0)));
        assert_eq!(parse_hex_color("FF8800"), None);
        assert_eq!(parse_hex_color("#FF88"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn display_color_falls_back_for_invalid_values() {
        let mut character = bob();
        assert_eq!(character.display_color(), "#FF8800");

        character.color = "orange".to_string();
        assert_eq!(character.display_color(), DEFAULT_CHARACTER_COLOR);
    }

    #[test]
    fn end_request_expires_after_validity_window() {
        let mut character = bob();
        assert!(!character.end_request_active(200.0));

        character.end_conversation_requested = true;
        character.end_conversation_requested_at = Some(200.0);
        character.end_conversation_requested_validity_duration = Some(30.0);

        assert!(character.end_request_active(215.0));
        assert!(character.end_request_active(230.0));
        assert!(!character.end_request_active(230.5));
    }

    #[test]
    fn end_request_without_window_stays_active() {
        let mut character = bob();
        character.end_conversation_requested = true;
        assert!(character.end_request_active(1_000_000.0));
    }

    #[test]
    fn deserializes_minimal_server_payload() {
        let json = r##"{
            "id": "alice",
            "name": "Alice",
            "color": "#123456",
            "action": "thinking:love",
            "action_started_at": 1700000000.5
        }"##;

        let character: CharacterState = serde_json::from_str(json).unwrap();
        assert_eq!(character.id, "alice");
        assert!(character.action.is_thinking());
        assert_eq!(character.current_mood, "neutral");
        assert_eq!(character.direction, Direction::Front);
        assert!(character.action_estimated_duration.is_none());
    }
}
