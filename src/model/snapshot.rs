use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::model::{Board, Session};
use crate::storage::{KeyValueStore, KEY_SESSION_SNAPSHOT};

/// Bump when the snapshot schema changes shape; older snapshots are then
/// ignored on load instead of being half-interpreted.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to put an interrupted play-through back on screen
/// without replaying a single move: the session counters plus the full tile
/// arrangement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Schema version; absent in the stored JSON means pre-versioning and is
    /// rejected.
    #[serde(default)]
    version: u32,
    pub session: Session,
    pub board: Board,
}

impl SessionSnapshot {
    pub fn new(session: Session, board: Board) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session,
            board,
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let contents = serde_json::to_string(self)?;
        store.write(KEY_SESSION_SNAPSHOT, &contents)?;
        trace!(target: "snapshot", "saved level {} snapshot", self.session.current_level);
        Ok(())
    }

    /// A malformed or version-mismatched snapshot reads as absence; the
    /// driver then offers a fresh start instead of propagating a broken
    /// object.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let contents = store.read(KEY_SESSION_SNAPSHOT)?;
        let snapshot: Self = match serde_json::from_str(&contents) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(target: "snapshot", "discarding unreadable snapshot: {}", e);
                return None;
            }
        };
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                target: "snapshot",
                "discarding snapshot with version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            );
            return None;
        }
        Some(snapshot)
    }

    pub fn exists(store: &dyn KeyValueStore) -> bool {
        store.read(KEY_SESSION_SNAPSHOT).is_some()
    }

    pub fn clear(store: &mut dyn KeyValueStore) {
        store.remove(KEY_SESSION_SNAPSHOT);
    }
}
