//! Optional stale-push filter
//!
//! The server resends the full log on every push without sequence numbers,
//! so reordered or duplicated pushes are normally undetectable. When the
//! server stamps snapshots with a monotonic `version`, this guard can drop
//! anything not newer than what was last admitted. Disabled by default;
//! unversioned snapshots always pass.

use pixeltales_domain::SceneSnapshot;

#[derive(Debug, Clone, Default)]
pub struct StaleSnapshotGuard {
    enabled: bool,
    last_version: Option<u64>,
    discarded: u64,
}

impl StaleSnapshotGuard {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide whether `snapshot` may be applied, recording its version if so.
    pub fn admit(&mut self, snapshot: &SceneSnapshot) -> bool {
        let Some(incoming) = snapshot.version else {
            return true;
        };

        if self.enabled {
            if let Some(last) = self.last_version {
                if incoming <= last {
                    self.discarded += 1;
                    tracing::debug!(
                        incoming,
                        last,
                        discarded = self.discarded,
                        "Discarding stale scene snapshot"
                    );
                    return false;
                }
            }
        }

        self.last_version = Some(incoming);
        true
    }

    /// Forget the last seen version (a reconnect may land on a restarted server).
    pub fn reset(&mut self) {
        self.last_version = None;
    }

    pub fn discarded_count(&self) -> u64 {
        self.discarded
    }
}
