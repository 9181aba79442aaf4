//! Conversation messages
//!
//! Messages are created by the upstream conversation service and appended to
//! the scene log. The client treats them as immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CharacterId;

/// Base seconds a line of dialogue stays on screen
pub const BASE_SPEAKING_TIME_SECS: f64 = 5.0;
/// Additional seconds per character of dialogue
pub const SPEAKING_TIME_PER_CHAR_SECS: f64 = 0.05;
/// Highest value of `conversation_rating`
pub const MAX_CONVERSATION_RATING: u8 = 10;

/// Speaking time the server assigns to a line of `len` characters.
pub fn speaking_time_for(len: usize) -> f64 {
    BASE_SPEAKING_TIME_SECS + (len as f64) * SPEAKING_TIME_PER_CHAR_SECS
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Sender
    pub character: CharacterId,
    /// `None` while the turn is still being generated
    #[serde(default)]
    pub content: Option<String>,
    /// Sender's free-form label for whoever they are addressing
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub thoughts: String,
    /// Free-form mood description
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub mood_emoji: String,
    /// Single glyph reacting to the previous message
    #[serde(default)]
    pub reaction_on_previous_message: Option<String>,
    /// ISO-8601 timestamp exactly as the server formatted it
    #[serde(default)]
    pub timestamp: String,
    /// Unix timestamp (seconds)
    pub unix_timestamp: f64,
    /// Seconds the speech bubble should stay up
    pub calculated_speaking_time: f64,
    #[serde(default)]
    pub conversation_rating: Option<i32>,
    #[serde(default)]
    pub end_conversation: bool,
}

impl Message {
    /// Build a spoken message with the server's speaking-time formula.
    pub fn spoken(
        character: impl Into<CharacterId>,
        content: impl Into<String>,
        unix_timestamp: f64,
    ) -> Self {
        let content = content.into();
        let calculated_speaking_time = speaking_time_for(content.chars().count());
        Self {
            character: character.into(),
            content: Some(content),
            recipient: String::new(),
            thoughts: String::new(),
            mood: String::new(),
            mood_emoji: String::new(),
            reaction_on_previous_message: None,
            timestamp: String::new(),
            unix_timestamp,
            calculated_speaking_time,
            conversation_rating: None,
            end_conversation: false,
        }
    }

    /// Whether the content has not been produced yet.
    pub fn is_pending(&self) -> bool {
        self.content.is_none()
    }

    /// Text to show in a bubble; empty while pending.
    pub fn display_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Wall-clock instant the message was produced.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        if !self.unix_timestamp.is_finite() {
            return None;
        }
        let secs = self.unix_timestamp.floor();
        let nanos = ((self.unix_timestamp - secs) * 1_000_000_000.0) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }

    /// Speaking time in seconds, recomputed from the content length when the
    /// server sent something unusable (negative or non-finite).
    pub fn effective_speaking_time(&self) -> f64 {
        if self.calculated_speaking_time.is_finite() && self.calculated_speaking_time >= 0.0 {
            self.calculated_speaking_time
        } else {
            speaking_time_for(self.display_text().chars().count())
        }
    }

    /// Rating clamped into `0..=10` for display.
    pub fn display_rating(&self) -> Option<u8> {
        self.conversation_rating
            .map(|rating| rating.clamp(0, i32::from(MAX_CONVERSATION_RATING)) as u8)
    }

    /// Whether the rating is present and outside `0..=10`.
    pub fn has_out_of_range_rating(&self) -> bool {
        self.conversation_rating
            .is_some_and(|rating| !(0..=i32::from(MAX_CONVERSATION_RATING)).contains(&rating))
    }
}
