//! Live/History mode state machine
//!
//! `Live` follows the newest snapshot. `History` pins the display to one
//! message of the log frozen at entry. A global input latch (an open modal
//! or overlay) blocks toggling and navigation regardless of mode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pixeltales_domain::SceneSnapshot;

use crate::ports::outbound::SceneRenderer;
use crate::state::history_cursor::{HistoryCursor, NavigationDirection, NavigationError};

/// Default duration of the invalid-navigation feedback
pub const DEFAULT_NAV_FEEDBACK: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    History { cursor: Option<usize> },
}

/// What to do with a snapshot that was just applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotGate {
    /// Drive effects and the renderer
    Display,
    /// Keep it in the store only; History mode owns the screen
    Suppressed,
}

/// Why an input event was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRejection {
    InputDisabled,
    AlreadyInMode,
    NotInHistory,
    Navigation(NavigationError),
}

#[derive(Debug)]
pub struct ModeController {
    history: Option<HistoryCursor>,
    input_disabled: bool,
    feedback_duration: Duration,
    feedback_until: Option<Instant>,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(DEFAULT_NAV_FEEDBACK)
    }
}

impl ModeController {
    pub fn new(feedback_duration: Duration) -> Self {
        Self {
            history: None,
            input_disabled: false,
            feedback_duration,
            feedback_until: None,
        }
    }

    pub fn mode(&self) -> Mode {
        match &self.history {
            None => Mode::Live,
            Some(cursor) => Mode::History {
                cursor: cursor.index(),
            },
        }
    }

    pub fn is_live(&self) -> bool {
        self.history.is_none()
    }

    pub fn is_input_disabled(&self) -> bool {
        self.input_disabled
    }

    pub fn set_input_disabled(&mut self, disabled: bool) {
        if self.input_disabled != disabled {
            tracing::debug!(disabled, "Input latch changed");
        }
        self.input_disabled = disabled;
    }

    /// Live → History, freezing `current` (or an empty log when nothing has
    /// arrived yet). The message at the tail is shown immediately.
    pub fn enter_history(
        &mut self,
        current: Option<Arc<SceneSnapshot>>,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<(), InputRejection> {
        if self.input_disabled {
            return Err(InputRejection::InputDisabled);
        }
        if self.history.is_some() {
            return Err(InputRejection::AlreadyInMode);
        }

        let cursor = HistoryCursor::at_tail(current.unwrap_or_default());
        tracing::info!(
            messages = cursor.len(),
            cursor = ?cursor.index(),
            "Entered history mode"
        );

        self.feedback_until = None;
        if let Some(view) = cursor.current() {
            renderer.on_historical_message_for_display(&view);
        }
        self.history = Some(cursor);
        Ok(())
    }

    /// History → Live. The caller re-renders the latest snapshot.
    pub fn exit_history(&mut self) -> Result<(), InputRejection> {
        if self.input_disabled {
            return Err(InputRejection::InputDisabled);
        }
        // The next entry starts a fresh cursor at the tail.
        if self.history.take().is_none() {
            return Err(InputRejection::AlreadyInMode);
        }

        self.feedback_until = None;
        tracing::info!("Returned to live mode");
        Ok(())
    }

    /// Step the history cursor. A move past either end leaves the cursor in
    /// place and raises the invalid-navigation signal once.
    pub fn navigate(
        &mut self,
        direction: NavigationDirection,
        now: Instant,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<usize, InputRejection> {
        if self.input_disabled {
            return Err(InputRejection::InputDisabled);
        }
        let Some(cursor) = self.history.as_mut() else {
            return Err(InputRejection::NotInHistory);
        };

        match cursor.navigate(direction) {
            Ok(index) => {
                if let Some(view) = cursor.current() {
                    renderer.on_historical_message_for_display(&view);
                }
                Ok(index)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Invalid history navigation");
                self.feedback_until = Some(now + self.feedback_duration);
                renderer.on_invalid_navigation(direction);
                Err(InputRejection::Navigation(e))
            }
        }
    }

    /// Decide whether a freshly applied snapshot reaches the renderer.
    pub fn on_snapshot(&self) -> SnapshotGate {
        if self.is_live() {
            SnapshotGate::Display
        } else {
            SnapshotGate::Suppressed
        }
    }

    /// Whether the invalid-navigation feedback is still showing
    pub fn feedback_active(&self, now: Instant) -> bool {
        self.feedback_until.is_some_and(|until| now < until)
    }

    pub fn cursor(&self) -> Option<&HistoryCursor> {
        self.history.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::MockSceneRenderer;
    use crate::state::HistoricalView;
    use mockall::predicate::eq;
    use pixeltales_domain::Message;

    fn three_messages() -> Arc<SceneSnapshot> {
        Arc::new(SceneSnapshot {
            messages: vec![
                Message::spoken("bob", "hi", 1.0),
                Message::spoken("alice", "hello", 2.0),
                Message::spoken("bob", "bye", 3.0),
            ],
            ..Default::default()
        })
    }

    fn quiet_renderer() -> MockSceneRenderer {
        let mut renderer = MockSceneRenderer::new();
        renderer
            .expect_on_historical_message_for_display()
            .return_const(());
        renderer
    }

    #[test]
    fn starts_live() {
        let modes = ModeController::default();
        assert_eq!(modes.mode(), Mode::Live);
        assert_eq!(modes.on_snapshot(), SnapshotGate::Display);
    }

    #[test]
    fn entering_history_shows_tail_message() {
        let mut renderer = MockSceneRenderer::new();
        renderer
            .expect_on_historical_message_for_display()
            .withf(|view: &HistoricalView| view.index == 2 && view.total == 3)
            .times(1)
            .return_const(());

        let mut modes = ModeController::default();
        modes.enter_history(Some(three_messages()), &mut renderer).unwrap();

        assert_eq!(modes.mode(), Mode::History { cursor: Some(2) });
        assert_eq!(modes.on_snapshot(), SnapshotGate::Suppressed);
    }

    #[test]
    fn navigating_past_the_tail_signals_exactly_once() {
        let mut renderer = quiet_renderer();
        renderer
            .expect_on_invalid_navigation()
            .with(eq(NavigationDirection::Next))
            .times(1)
            .return_const(());

        let mut modes = ModeController::default();
        let now = Instant::now();
        modes.enter_history(Some(three_messages()), &mut renderer).unwrap();

        let result = modes.navigate(NavigationDirection::Next, now, &mut renderer);

        assert!(matches!(result, Err(InputRejection::Navigation(_))));
        assert_eq!(modes.mode(), Mode::History { cursor: Some(2) });
        assert!(modes.feedback_active(now));
        assert!(!modes.feedback_active(now + DEFAULT_NAV_FEEDBACK));
    }

    #[test]
    fn three_message_walk_rejects_third_step_back() {
        let mut renderer = quiet_renderer();
        renderer
            .expect_on_invalid_navigation()
            .with(eq(NavigationDirection::Previous))
            .times(1)
            .return_const(());

        let mut modes = ModeController::default();
        let now = Instant::now();
        modes.enter_history(Some(three_messages()), &mut renderer).unwrap();

        assert_eq!(
            modes.navigate(NavigationDirection::Previous, now, &mut renderer),
            Ok(1)
        );
        assert_eq!(
            modes.navigate(NavigationDirection::Previous, now, &mut renderer),
            Ok(0)
        );
        assert!(modes
            .navigate(NavigationDirection::Previous, now, &mut renderer)
            .is_err());
        assert_eq!(modes.mode(), Mode::History { cursor: Some(0) });
    }

    #[test]
    fn navigation_is_ignored_in_live_mode() {
        let mut renderer = MockSceneRenderer::new();
        let mut modes = ModeController::default();

        assert_eq!(
            modes.navigate(NavigationDirection::Previous, Instant::now(), &mut renderer),
            Err(InputRejection::NotInHistory)
        );
    }

    #[test]
    fn input_latch_blocks_toggles_and_navigation() {
        let mut renderer = quiet_renderer();
        let mut modes = ModeController::default();

        modes.set_input_disabled(true);
        assert_eq!(
            modes.enter_history(Some(three_messages()), &mut renderer),
            Err(InputRejection::InputDisabled)
        );
        assert!(modes.is_live());

        modes.set_input_disabled(false);
        modes.enter_history(Some(three_messages()), &mut renderer).unwrap();

        modes.set_input_disabled(true);
        assert_eq!(
            modes.navigate(NavigationDirection::Previous, Instant::now(), &mut renderer),
            Err(InputRejection::InputDisabled)
        );
        assert_eq!(modes.exit_history(), Err(InputRejection::InputDisabled));
        assert_eq!(modes.mode(), Mode::History { cursor: Some(2) });
    }

    #[test]
    fn enter_then_exit_returns_to_live() {
        let mut renderer = quiet_renderer();
        let mut modes = ModeController::default();

        modes.enter_history(Some(three_messages()), &mut renderer).unwrap();
        modes.exit_history().unwrap();

        assert_eq!(modes.mode(), Mode::Live);
        assert_eq!(modes.on_snapshot(), SnapshotGate::Display);
        assert_eq!(modes.exit_history(), Err(InputRejection::AlreadyInMode));
    }

    #[test]
    fn toggling_cancels_navigation_feedback() {
        let mut renderer = quiet_renderer();
        renderer.expect_on_invalid_navigation().return_const(());
        let mut modes = ModeController::default();
        let now = Instant::now();

        modes.enter_history(Some(three_messages()), &mut renderer).unwrap();
        let _ = modes.navigate(NavigationDirection::Next, now, &mut renderer);
        assert!(modes.feedback_active(now));

        modes.exit_history().unwrap();
        assert!(!modes.feedback_active(now));
    }

    #[test]
    fn history_without_any_snapshot_has_no_cursor() {
        let mut renderer = MockSceneRenderer::new();
        renderer.expect_on_historical_message_for_display().never();
        let mut modes = ModeController::default();

        modes.enter_history(None, &mut renderer).unwrap();

        assert_eq!(modes.mode(), Mode::History { cursor: None });
    }
}
