//! Headless adapters that log what a real renderer would draw.

use pixeltales_domain::SceneSnapshot;

use crate::ports::outbound::{SceneRenderer, StatusIndicator, StatusSink};
use crate::state::{EffectFrame, HistoricalView, NavigationDirection};

/// Renderer that writes each display call to the tracing log.
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_frame: Option<EffectFrame>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneRenderer for LogRenderer {
    fn on_snapshot_for_display(&mut self, snapshot: &SceneSnapshot) {
        tracing::info!(
            scene_id = snapshot.scene_id,
            characters = snapshot.characters.len(),
            messages = snapshot.messages.len(),
            active = snapshot.conversation_active,
            ended = snapshot.conversation_ended,
            visitors = snapshot.visitor_count,
            "Scene"
        );
        for character in snapshot.characters.values() {
            tracing::info!(
                character_id = %character.id,
                name = %character.name,
                action = %character.action,
                mood = %character.current_mood,
                x = character.position.x,
                y = character.position.y,
                "  character"
            );
        }
    }

    fn on_effects_for_display(&mut self, frame: &EffectFrame) {
        // Ticks repeat the same frame shape many times a second; only log
        // when something other than the countdown changed.
        let changed = match &self.last_frame {
            None => true,
            Some(last) => {
                last.thinking != frame.thinking
                    || last.bubbles.len() != frame.bubbles.len()
                    || last
                        .bubbles
                        .iter()
                        .zip(&frame.bubbles)
                        .any(|(a, b)| a.content != b.content || a.is_expired() != b.is_expired())
            }
        };

        if changed {
            for bubble in &frame.bubbles {
                tracing::info!(
                    character_id = %bubble.character_id,
                    mood = %bubble.mood_emoji,
                    remaining_ms = bubble.remaining.as_millis() as u64,
                    "  💬 {}",
                    bubble.content
                );
            }
            for indicator in &frame.thinking {
                tracing::info!(
                    character_id = %indicator.character_id,
                    "  {} thinking",
                    indicator.kind.emoji()
                );
            }
        }
        self.last_frame = Some(frame.clone());
    }

    fn on_historical_message_for_display(&mut self, view: &HistoricalView) {
        let speaker = view
            .character
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(view.message.character.as_str());
        tracing::info!(
            position = view.index + 1,
            total = view.total,
            mood = %view.message.mood_emoji,
            rating = ?view.message.display_rating(),
            "[history] {speaker}: {}",
            view.message.display_text()
        );
    }

    fn on_invalid_navigation(&mut self, direction: NavigationDirection) {
        tracing::info!(?direction, "[history] no more messages in that direction");
    }
}

/// Status display that writes indicator changes to the tracing log.
#[derive(Debug, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn show_status(&mut self, indicator: StatusIndicator) {
        if indicator.is_persistent() {
            tracing::error!(status = %indicator, "Connection status");
        } else {
            tracing::info!(status = %indicator, "Connection status");
        }
    }
}
