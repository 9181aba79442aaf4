//! Character action vocabulary
//!
//! The server reports what each character is currently doing as a short
//! string: `idle`, `speaking`, `thinking`, or `thinking:<emotion>`. The
//! thinking sub-variant only colours the in-progress indicator; it never
//! carries timing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Emotional flavour of a `thinking` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThinkingKind {
    /// Plain `thinking` with no sub-variant
    #[default]
    Neutral,
    Love,
    Anger,
    Sadness,
    Surprise,
    Fear,
}

impl ThinkingKind {
    /// Wire suffix after `thinking:`; `None` for the plain variant.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            ThinkingKind::Neutral => None,
            ThinkingKind::Love => Some("love"),
            ThinkingKind::Anger => Some("anger"),
            ThinkingKind::Sadness => Some("sadness"),
            ThinkingKind::Surprise => Some("surprise"),
            ThinkingKind::Fear => Some("fear"),
        }
    }

    /// Glyph shown inside the thought bubble
    pub fn emoji(&self) -> &'static str {
        match self {
            ThinkingKind::Neutral => "💭",
            ThinkingKind::Love => "❤️",
            ThinkingKind::Anger => "💢",
            ThinkingKind::Sadness => "💧",
            ThinkingKind::Surprise => "❗",
            ThinkingKind::Fear => "😨",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "love" => Some(ThinkingKind::Love),
            "anger" => Some(ThinkingKind::Anger),
            "sadness" => Some(ThinkingKind::Sadness),
            "surprise" => Some(ThinkingKind::Surprise),
            "fear" => Some(ThinkingKind::Fear),
            _ => None,
        }
    }
}

/// What a character is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CharacterAction {
    #[default]
    Idle,
    Thinking(ThinkingKind),
    Speaking,
}

impl CharacterAction {
    pub fn is_speaking(&self) -> bool {
        matches!(self, CharacterAction::Speaking)
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, CharacterAction::Thinking(_))
    }

    /// The thinking sub-variant, if the character is thinking
    pub fn thinking_kind(&self) -> Option<ThinkingKind> {
        match self {
            CharacterAction::Thinking(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for CharacterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterAction::Idle => f.write_str("idle"),
            CharacterAction::Speaking => f.write_str("speaking"),
            CharacterAction::Thinking(kind) => match kind.suffix() {
                Some(suffix) => write!(f, "thinking:{suffix}"),
                None => f.write_str("thinking"),
            },
        }
    }
}

impl FromStr for CharacterAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(CharacterAction::Idle),
            "speaking" => Ok(CharacterAction::Speaking),
            "thinking" => Ok(CharacterAction::Thinking(ThinkingKind::Neutral)),
            other => other
                .strip_prefix("thinking:")
                .and_then(ThinkingKind::from_suffix)
                .map(CharacterAction::Thinking)
                .ok_or_else(|| DomainError::parse(format!("Unknown character action: {other}"))),
        }
    }
}

impl TryFrom<String> for CharacterAction {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CharacterAction> for String {
    fn from(value: CharacterAction) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_server_action() {
        let cases = [
            ("idle", CharacterAction::Idle),
            ("speaking", CharacterAction::Speaking),
            ("thinking", CharacterAction::Thinking(ThinkingKind::Neutral)),
            ("thinking:love", CharacterAction::Thinking(ThinkingKind::Love)),
            ("thinking:anger", CharacterAction::Thinking(ThinkingKind::Anger)),
            ("thinking:sadness", CharacterAction::Thinking(ThinkingKind::Sadness)),
            ("thinking:surprise", CharacterAction::Thinking(ThinkingKind::Surprise)),
            ("thinking:fear", CharacterAction::Thinking(ThinkingKind::Fear)),
        ];

        for (raw, expected) in cases {
            let parsed: CharacterAction = raw.parse().unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), raw);
        }
    }

    #[test]
    fn rejects_unknown_actions() {
        assert!("dancing".parse::<CharacterAction>().is_err());
        assert!("thinking:boredom".parse::<CharacterAction>().is_err());
        assert!("thinking:".parse::<CharacterAction>().is_err());
    }

    #[test]
    fn deserializes_from_json_string() {
        let action: CharacterAction = serde_json::from_str("\"thinking:fear\"").unwrap();
        assert!(action.is_thinking());
        assert_eq!(action.thinking_kind(), Some(ThinkingKind::Fear));

        let err = serde_json::from_str::<CharacterAction>("\"waving\"");
        assert!(err.is_err());
    }
}
