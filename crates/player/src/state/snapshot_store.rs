//! Snapshot store - the single holder of the current authoritative scene
//!
//! Every pushed snapshot replaces the previous one wholesale (last write
//! wins). Subscribers are notified synchronously in subscription order; a
//! failing or panicking subscriber is logged and skipped so the rest of the
//! fan-out still happens.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;

use pixeltales_domain::SceneSnapshot;

/// Failure reported by (or caught from) a snapshot listener.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener returned an error
    #[error("listener rejected snapshot: {0}")]
    Rejected(String),

    /// The listener panicked; the panic was contained
    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

/// Callback invoked with every applied snapshot.
pub type SnapshotListener =
    Box<dyn FnMut(&Arc<SceneSnapshot>) -> Result<(), ListenerError> + Send + 'static>;

/// Handle returned by [`SnapshotStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Holds the most recent snapshot and fans it out to listeners.
#[derive(Default)]
pub struct SnapshotStore {
    current: Option<Arc<SceneSnapshot>>,
    listeners: Vec<(SubscriptionId, SnapshotListener)>,
    next_id: u64,
    applied: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot and notify every listener.
    ///
    /// Never rejects: ordering is the channel's responsibility.
    pub fn apply(&mut self, snapshot: SceneSnapshot) -> Arc<SceneSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.current = Some(Arc::clone(&snapshot));
        self.applied += 1;

        tracing::debug!(
            applied = self.applied,
            messages = snapshot.messages.len(),
            characters = snapshot.characters.len(),
            "Applied scene snapshot"
        );

        for (id, listener) in self.listeners.iter_mut() {
            deliver(*id, listener, &snapshot);
        }

        snapshot
    }

    /// The snapshot applied last, if any.
    pub fn current(&self) -> Option<&Arc<SceneSnapshot>> {
        self.current.as_ref()
    }

    /// Number of snapshots applied since creation.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }

    /// Register a listener. The current snapshot, if present, is delivered
    /// once immediately; earlier snapshots are never replayed.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Arc<SceneSnapshot>) -> Result<(), ListenerError> + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let mut listener: SnapshotListener = Box::new(listener);
        if let Some(current) = &self.current {
            deliver(id, &mut listener, current);
        }
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

fn deliver(id: SubscriptionId, listener: &mut SnapshotListener, snapshot: &Arc<SceneSnapshot>) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(snapshot)))
        .unwrap_or_else(|payload| Err(ListenerError::Panicked(panic_message(payload.as_ref()))));

    if let Err(e) = outcome {
        tracing::warn!(subscription = ?id, error = %e, "Snapshot listener failed");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn snapshot(scene_id: i64) -> SceneSnapshot {
        SceneSnapshot {
            scene_id,
            ..Default::default()
        }
    }

    #[test]
    fn last_applied_snapshot_wins() {
        let mut store = SnapshotStore::new();
        assert!(store.current().is_none());

        for id in [3, 1, 2, 2, 9] {
            store.apply(snapshot(id));
        }

        assert_eq!(store.current().unwrap().scene_id, 9);
        assert_eq!(store.applied_count(), 5);
    }

    #[test]
    fn listeners_are_notified_in_subscription_order() {
        let mut store = SnapshotStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            store.subscribe(move |snap| {
                seen.lock().unwrap().push((name, snap.scene_id));
                Ok(())
            });
        }

        store.apply(snapshot(1));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("third", 1)]
        );
    }

    #[test]
    fn late_subscriber_gets_only_the_current_snapshot() {
        let mut store = SnapshotStore::new();
        store.apply(snapshot(1));
        store.apply(snapshot(2));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        store.subscribe(move |snap| {
            seen_clone.lock().unwrap().push(snap.scene_id);
            Ok(())
        });

        assert_eq!(*seen.lock().unwrap(), vec![2]);

        store.apply(snapshot(3));
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
    }

    #[test]
    fn subscribing_to_empty_store_delivers_nothing() {
        let mut store = SnapshotStore::new();
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = Arc::clone(&calls);
        store.subscribe(move |_| {
            *calls_clone.lock().unwrap() += 1;
            Ok(())
        });
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn failing_listeners_do_not_block_others() {
        let mut store = SnapshotStore::new();
        let reached = Arc::new(Mutex::new(Vec::new()));

        store.subscribe(|_| Err(ListenerError::rejected("bad data")));
        store.subscribe(|_| panic!("renderer exploded"));
        let reached_clone = Arc::clone(&reached);
        store.subscribe(move |snap| {
            reached_clone.lock().unwrap().push(snap.scene_id);
            Ok(())
        });

        store.apply(snapshot(4));
        store.apply(snapshot(5));

        assert_eq!(*reached.lock().unwrap(), vec![4, 5]);
        assert_eq!(store.subscriber_count(), 3);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut store = SnapshotStore::new();
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = Arc::clone(&calls);
        let id = store.subscribe(move |_| {
            *calls_clone.lock().unwrap() += 1;
            Ok(())
        });

        store.apply(snapshot(1));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.apply(snapshot(2));

        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }
}
