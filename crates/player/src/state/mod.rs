//! Client-side state owned by the session
//!
//! Each container here is owned by exactly one component and mutated only
//! through its own methods. Cross-component flow goes through the session.

mod effect_state;
mod history_cursor;
mod mode_state;
mod snapshot_store;
mod stale_guard;

pub use effect_state::{
    BubbleView, EffectController, EffectFrame, EffectRestartPolicy, SpeechEffect,
    ThinkingIndicator,
};
pub use history_cursor::{HistoricalView, HistoryCursor, NavigationDirection, NavigationError};
pub use mode_state::{InputRejection, Mode, ModeController, SnapshotGate, DEFAULT_NAV_FEEDBACK};
pub use snapshot_store::{ListenerError, SnapshotListener, SnapshotStore, SubscriptionId};
pub use stale_guard::StaleSnapshotGuard;
