//! Scene Renderer Port - the drawing side of the player
//!
//! The renderer never sees raw channel events. It is told what to display:
//! the live snapshot plus derived effects while following the conversation,
//! or a single frozen message while the viewer scrubs through history.

use pixeltales_domain::SceneSnapshot;

use crate::state::{EffectFrame, HistoricalView, NavigationDirection};

/// Port for the external scene renderer
///
/// All methods are called from the session's single control flow and must
/// return promptly; they never block on I/O.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SceneRenderer: Send {
    /// Live mode: display the latest authoritative snapshot
    fn on_snapshot_for_display(&mut self, snapshot: &SceneSnapshot);

    /// Live mode: display the current speech bubbles and thinking indicators
    ///
    /// Called after every displayed snapshot and on effect ticks while any
    /// bubble countdown is running.
    fn on_effects_for_display(&mut self, frame: &EffectFrame);

    /// History mode: display one past message statically (no countdown)
    fn on_historical_message_for_display(&mut self, view: &HistoricalView);

    /// History mode: a navigation step ran past either end of the log
    fn on_invalid_navigation(&mut self, direction: NavigationDirection);
}
