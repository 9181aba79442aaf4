//! Scene snapshot - the authoritative state pushed by the server
//!
//! A snapshot always carries the full message log to date; there is no
//! delta format. The client replaces its snapshot wholesale on every push.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{CharacterState, Message};
use crate::CharacterId;

/// One complete authoritative scene state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub scene_id: i64,
    #[serde(default)]
    pub scene_config_id: i64,
    #[serde(default)]
    pub characters: BTreeMap<CharacterId, CharacterState>,
    /// Chronological, append-only log
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub started_at: f64,
    #[serde(default)]
    pub conversation_active: bool,
    #[serde(default)]
    pub conversation_ended: bool,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub ended_at: Option<f64>,
    #[serde(default)]
    pub visitor_count: u32,
    /// Monotonic version stamp, when the server provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl SceneSnapshot {
    pub fn character(&self, id: &str) -> Option<&CharacterState> {
        self.characters.get(id)
    }

    /// The most recent message sent by `character_id`, with its log index.
    pub fn latest_message_for(&self, character_id: &str) -> Option<(usize, &Message)> {
        self.messages
            .iter()
            .enumerate()
            .rev()
            .find(|(_, message)| message.character == character_id)
    }

    /// Index of the newest message, `None` when the log is empty.
    pub fn last_message_index(&self) -> Option<usize> {
        self.messages.len().checked_sub(1)
    }

    /// Seconds from `started_at` until `ended_at`, or until `now_unix` while running.
    pub fn conversation_duration(&self, now_unix: f64) -> f64 {
        let end = self.ended_at.unwrap_or(now_unix);
        (end - self.started_at).max(0.0)
    }

    /// Characters whose end-of-conversation request is currently valid.
    pub fn end_requests_active(&self, now_unix: f64) -> usize {
        self.characters
            .values()
            .filter(|character| character.end_request_active(now_unix))
            .count()
    }
}
