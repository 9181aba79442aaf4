//! Effect state - speech bubbles and thinking indicators
//!
//! Effects are derived from the latest snapshot and owned here; nothing in
//! them is authoritative. A speaking character gets a bubble for its latest
//! message whose countdown decays linearly over `calculated_speaking_time`,
//! measured from when the bubble was created locally (the server's
//! `action_started_at` can precede the bubble by network latency). A
//! thinking character gets an indicator with no timer at all.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use pixeltales_domain::{CharacterId, Message, SceneSnapshot, ThinkingKind};

/// What to do with a running bubble when a snapshot repeats the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectRestartPolicy {
    /// Keep the countdown running while the latest message is unchanged
    #[default]
    Preserve,
    /// Rebuild every bubble from scratch on every snapshot, restarting its
    /// countdown even without new content
    Recreate,
}

impl FromStr for EffectRestartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "recreate" => Ok(Self::Recreate),
            other => Err(format!("unknown effect restart policy: {other}")),
        }
    }
}

impl fmt::Display for EffectRestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preserve => f.write_str("preserve"),
            Self::Recreate => f.write_str("recreate"),
        }
    }
}

/// Identity of the message a bubble was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MessageKey {
    index: usize,
    unix_timestamp: f64,
}

/// A timed speech bubble for one character.
#[derive(Debug, Clone)]
pub struct SpeechEffect {
    pub character_id: CharacterId,
    /// Position of the message in the snapshot log
    pub message_index: usize,
    pub content: String,
    pub color: String,
    pub mood_emoji: String,
    pub duration: Duration,
    pub started_at: Instant,
    key: MessageKey,
    expiry_reported: bool,
}

impl SpeechEffect {
    fn from_message(
        character_id: CharacterId,
        color: &str,
        index: usize,
        message: &Message,
        now: Instant,
    ) -> Self {
        let seconds = message.effective_speaking_time();
        let duration = Duration::try_from_secs_f64(seconds).unwrap_or_else(|_| {
            tracing::warn!(
                character_id = %character_id,
                seconds,
                "Speaking time out of range; using zero-length bubble"
            );
            Duration::ZERO
        });

        Self {
            character_id,
            message_index: index,
            content: message.display_text().to_string(),
            color: color.to_string(),
            mood_emoji: message.mood_emoji.clone(),
            duration,
            started_at: now,
            key: MessageKey {
                index,
                unix_timestamp: message.unix_timestamp,
            },
            expiry_reported: false,
        }
    }

    /// Time left on the countdown
    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    /// Fraction of the countdown left: 1.0 when created, 0.0 when done
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.remaining(now).as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    fn shows_same_message(&self, index: usize, message: &Message) -> bool {
        self.key.index == index && self.key.unix_timestamp == message.unix_timestamp
    }
}

/// Persistent "in progress" marker for a thinking character.
#[derive(Debug, Clone, PartialEq)]
pub struct ThinkingIndicator {
    pub character_id: CharacterId,
    pub kind: ThinkingKind,
    pub color: String,
}

/// One bubble as handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleView {
    pub character_id: CharacterId,
    pub content: String,
    pub color: String,
    pub mood_emoji: String,
    pub remaining: Duration,
    /// 1.0 → 0.0
    pub progress: f64,
}

impl BubbleView {
    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Everything the renderer needs to draw effects at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectFrame {
    pub bubbles: Vec<BubbleView>,
    pub thinking: Vec<ThinkingIndicator>,
}

impl EffectFrame {
    pub fn bubble(&self, character_id: &str) -> Option<&BubbleView> {
        self.bubbles
            .iter()
            .find(|bubble| bubble.character_id == character_id)
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty() && self.thinking.is_empty()
    }
}

/// Derives and times per-character effects from snapshots.
#[derive(Debug, Default)]
pub struct EffectController {
    policy: EffectRestartPolicy,
    speech: BTreeMap<CharacterId, SpeechEffect>,
    thinking: BTreeMap<CharacterId, ThinkingIndicator>,
}

impl EffectController {
    pub fn new(policy: EffectRestartPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> EffectRestartPolicy {
        self.policy
    }

    /// Rebuild effect state from `snapshot`.
    ///
    /// Characters that are not speaking lose their bubble; a speaking
    /// character without any message in the log gets none (logged, not an
    /// error). Repeating the same snapshot is harmless under `Preserve`.
    pub fn on_snapshot(&mut self, snapshot: &SceneSnapshot, now: Instant) {
        let mut previous = std::mem::take(&mut self.speech);
        self.thinking.clear();

        for (id, character) in &snapshot.characters {
            let color = character.display_color();

            if let Some(kind) = character.action.thinking_kind() {
                self.thinking.insert(
                    id.clone(),
                    ThinkingIndicator {
                        character_id: id.clone(),
                        kind,
                        color: color.to_string(),
                    },
                );
                continue;
            }

            if !character.action.is_speaking() {
                continue;
            }

            let Some((index, message)) = snapshot.latest_message_for(id.as_str()) else {
                tracing::warn!(
                    character_id = %id,
                    "Speaking character has no messages; skipping bubble"
                );
                continue;
            };

            if message.has_out_of_range_rating() {
                tracing::warn!(
                    character_id = %id,
                    rating = ?message.conversation_rating,
                    "Conversation rating outside 0-10"
                );
            }

            let effect = match previous.remove(id) {
                Some(mut running)
                    if self.policy == EffectRestartPolicy::Preserve
                        && running.shows_same_message(index, message) =>
                {
                    running.color = color.to_string();
                    running
                }
                _ => {
                    tracing::debug!(
                        character_id = %id,
                        message_index = index,
                        seconds = message.effective_speaking_time(),
                        "Starting speech bubble"
                    );
                    SpeechEffect::from_message(id.clone(), color, index, message, now)
                }
            };
            self.speech.insert(id.clone(), effect);
        }

        for id in previous.keys() {
            tracing::debug!(character_id = %id, "Speech bubble removed");
        }
    }

    pub fn speech(&self, character_id: &str) -> Option<&SpeechEffect> {
        self.speech.get(character_id)
    }

    pub fn thinking(&self, character_id: &str) -> Option<&ThinkingIndicator> {
        self.thinking.get(character_id)
    }

    /// Whether any bubble countdown is still running
    pub fn has_active_timers(&self, now: Instant) -> bool {
        self.speech.values().any(|effect| !effect.is_expired(now))
    }

    /// Snapshot of all effects at `now`
    pub fn frame(&self, now: Instant) -> EffectFrame {
        EffectFrame {
            bubbles: self
                .speech
                .values()
                .map(|effect| BubbleView {
                    character_id: effect.character_id.clone(),
                    content: effect.content.clone(),
                    color: effect.color.clone(),
                    mood_emoji: effect.mood_emoji.clone(),
                    remaining: effect.remaining(now),
                    progress: effect.progress(now),
                })
                .collect(),
            thinking: self.thinking.values().cloned().collect(),
        }
    }

    /// Frame for a timer tick, or `None` when nothing is counting down.
    ///
    /// A bubble that reached zero since the previous tick yields one final
    /// frame so the renderer sees the countdown hit zero.
    pub fn tick(&mut self, now: Instant) -> Option<EffectFrame> {
        let mut changed = false;
        for effect in self.speech.values_mut() {
            if !effect.is_expired(now) {
                changed = true;
            } else if !effect.expiry_reported {
                effect.expiry_reported = true;
                changed = true;
            }
        }
        changed.then(|| self.frame(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixeltales_domain::{CharacterAction, CharacterState};

    fn character(id: &str, action: CharacterAction) -> CharacterState {
        CharacterState::new(id, id.to_uppercase(), "#112233", action, 0.0)
    }

    fn scene(characters: Vec<CharacterState>, messages: Vec<Message>) -> SceneSnapshot {
        SceneSnapshot {
            characters: characters
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            messages,
            ..Default::default()
        }
    }

    fn hello_from_bob() -> Message {
        let mut message = Message::spoken("bob", "hello", 10.0);
        message.calculated_speaking_time = 4.0;
        message.mood_emoji = "😊".to_string();
        message
    }

    #[test]
    fn idle_to_speaking_creates_four_second_bubble_that_decays_to_zero() {
        let mut effects = EffectController::new(EffectRestartPolicy::Preserve);
        let t0 = Instant::now();

        let a = scene(vec![character("bob", CharacterAction::Idle)], vec![]);
        effects.on_snapshot(&a, t0);
        assert!(effects.speech("bob").is_none());

        let b = scene(
            vec![character("bob", CharacterAction::Speaking)],
            vec![hello_from_bob()],
        );
        effects.on_snapshot(&b, t0);

        let bubble = effects.speech("bob").unwrap();
        assert_eq!(bubble.content, "hello");
        assert_eq!(bubble.color, "#112233");
        assert_eq!(bubble.mood_emoji, "😊");
        assert_eq!(bubble.duration, Duration::from_secs(4));
        assert_eq!(bubble.progress(t0), 1.0);
        assert!((bubble.progress(t0 + Duration::from_secs(1)) - 0.75).abs() < 1e-9);
        assert_eq!(bubble.progress(t0 + Duration::from_secs(4)), 0.0);
        assert!(bubble.is_expired(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn non_speaking_characters_have_no_bubble() {
        let mut effects = EffectController::default();
        let now = Instant::now();
        let snapshot = scene(
            vec![
                character("bob", CharacterAction::Idle),
                character("alice", CharacterAction::Thinking(ThinkingKind::Love)),
            ],
            vec![
                Message::spoken("bob", "earlier", 1.0),
                Message::spoken("alice", "earlier too", 2.0),
            ],
        );

        effects.on_snapshot(&snapshot, now);

        assert!(effects.speech("bob").is_none());
        assert!(effects.speech("alice").is_none());
        assert!(effects.frame(now).bubbles.is_empty());
    }

    #[test]
    fn bubble_uses_the_latest_message_of_that_character() {
        let mut effects = EffectController::default();
        let now = Instant::now();
        let snapshot = scene(
            vec![
                character("bob", CharacterAction::Speaking),
                character("alice", CharacterAction::Idle),
            ],
            vec![
                Message::spoken("bob", "old line", 1.0),
                Message::spoken("alice", "reply", 2.0),
                Message::spoken("bob", "new line", 3.0),
                Message::spoken("alice", "interjection", 4.0),
            ],
        );

        effects.on_snapshot(&snapshot, now);

        let bubble = effects.speech("bob").unwrap();
        assert_eq!(bubble.content, "new line");
        assert_eq!(bubble.message_index, 2);
    }

    #[test]
    fn speaking_without_messages_is_skipped_not_fatal() {
        let mut effects = EffectController::default();
        let now = Instant::now();
        let snapshot = scene(
            vec![
                character("bob", CharacterAction::Speaking),
                character("alice", CharacterAction::Speaking),
            ],
            vec![Message::spoken("alice", "hi bob", 1.0)],
        );

        effects.on_snapshot(&snapshot, now);

        assert!(effects.speech("bob").is_none());
        assert_eq!(effects.speech("alice").unwrap().content, "hi bob");
    }

    #[test]
    fn thinking_indicator_has_no_timer() {
        let mut effects = EffectController::default();
        let now = Instant::now();
        let snapshot = scene(
            vec![character("bob", CharacterAction::Thinking(ThinkingKind::Fear))],
            vec![],
        );

        effects.on_snapshot(&snapshot, now);

        let indicator = effects.thinking("bob").unwrap();
        assert_eq!(indicator.kind, ThinkingKind::Fear);
        assert!(!effects.has_active_timers(now));
        assert_eq!(effects.frame(now + Duration::from_secs(3600)).thinking.len(), 1);
    }

    #[test]
    fn preserve_policy_keeps_countdown_on_duplicate_snapshot() {
        let mut effects = EffectController::new(EffectRestartPolicy::Preserve);
        let t0 = Instant::now();
        let snapshot = scene(
            vec![character("bob", CharacterAction::Speaking)],
            vec![hello_from_bob()],
        );

        effects.on_snapshot(&snapshot, t0);
        effects.on_snapshot(&snapshot, t0 + Duration::from_secs(2));

        let bubble = effects.speech("bob").unwrap();
        assert_eq!(bubble.started_at, t0);
        assert!((bubble.progress(t0 + Duration::from_secs(2)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recreate_policy_restarts_countdown_on_every_snapshot() {
        let mut effects = EffectController::new(EffectRestartPolicy::Recreate);
        let t0 = Instant::now();
        let t2 = t0 + Duration::from_secs(2);
        let snapshot = scene(
            vec![character("bob", CharacterAction::Speaking)],
            vec![hello_from_bob()],
        );

        effects.on_snapshot(&snapshot, t0);
        effects.on_snapshot(&snapshot, t2);

        let bubble = effects.speech("bob").unwrap();
        assert_eq!(bubble.started_at, t2);
        assert_eq!(bubble.progress(t2), 1.0);
    }

    #[test]
    fn new_message_restarts_countdown_under_preserve() {
        let mut effects = EffectController::new(EffectRestartPolicy::Preserve);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);

        let first = scene(
            vec![character("bob", CharacterAction::Speaking)],
            vec![hello_from_bob()],
        );
        effects.on_snapshot(&first, t0);

        let mut second_line = Message::spoken("bob", "and goodbye", 12.0);
        second_line.calculated_speaking_time = 2.0;
        let second = scene(
            vec![character("bob", CharacterAction::Speaking)],
            vec![hello_from_bob(), second_line],
        );
        effects.on_snapshot(&second, t1);

        let bubble = effects.speech("bob").unwrap();
        assert_eq!(bubble.content, "and goodbye");
        assert_eq!(bubble.started_at, t1);
        assert_eq!(bubble.duration, Duration::from_secs(2));
    }

    #[test]
    fn bubble_disappears_when_character_stops_speaking() {
        let mut effects = EffectController::default();
        let now = Instant::now();
        effects.on_snapshot(
            &scene(
                vec![character("bob", CharacterAction::Speaking)],
                vec![hello_from_bob()],
            ),
            now,
        );
        assert!(effects.speech("bob").is_some());

        effects.on_snapshot(
            &scene(vec![character("bob", CharacterAction::Idle)], vec![hello_from_bob()]),
            now,
        );
        assert!(effects.speech("bob").is_none());
    }

    #[test]
    fn tick_reports_expiry_exactly_once() {
        let mut effects = EffectController::default();
        let t0 = Instant::now();
        effects.on_snapshot(
            &scene(
                vec![character("bob", CharacterAction::Speaking)],
                vec![hello_from_bob()],
            ),
            t0,
        );

        let running = effects.tick(t0 + Duration::from_secs(1)).unwrap();
        assert!(!running.bubble("bob").unwrap().is_expired());

        let finished = effects.tick(t0 + Duration::from_secs(5)).unwrap();
        assert_eq!(finished.bubble("bob").unwrap().progress, 0.0);

        assert!(effects.tick(t0 + Duration::from_secs(6)).is_none());
    }

    #[test]
    fn pending_message_produces_empty_bubble() {
        let mut effects = EffectController::default();
        let now = Instant::now();
        let mut pending = hello_from_bob();
        pending.content = None;

        effects.on_snapshot(
            &scene(vec![character("bob", CharacterAction::Speaking)], vec![pending]),
            now,
        );

        assert_eq!(effects.speech("bob").unwrap().content, "");
    }

    #[test]
    fn restart_policy_parses_from_config_strings() {
        assert_eq!(
            "Preserve".parse::<EffectRestartPolicy>().unwrap(),
            EffectRestartPolicy::Preserve
        );
        assert_eq!(
            " recreate ".parse::<EffectRestartPolicy>().unwrap(),
            EffectRestartPolicy::Recreate
        );
        assert!("sometimes".parse::<EffectRestartPolicy>().is_err());
    }
}
