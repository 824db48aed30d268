use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Local};

use super::Snapshot;

struct Slot {
    snapshot: Arc<Snapshot>,
    updated_at: Option<DateTime<Local>>,
}

/// Single-slot holder for the last successfully retrieved snapshot.
///
/// Readers get a shared handle to an immutable snapshot, so a concurrent
/// `set` swaps the whole value and never exposes a partial one.
pub struct SnapshotCache {
    slot: RwLock<Slot>,
    generation: AtomicU64,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::empty())
    }

    /// Seed the cache with a known value, leaving `last_updated` unset.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: RwLock::new(Slot {
                snapshot: Arc::new(snapshot),
                updated_at: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> Arc<Snapshot> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot.snapshot)
    }

    pub fn set(&self, snapshot: Snapshot) {
        self.replace(Arc::new(snapshot));
    }

    pub fn replace(&self, snapshot: Arc<Snapshot>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.snapshot = snapshot;
        slot.updated_at = Some(Local::now());
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Local time of the last replace, `None` until the first success.
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.updated_at
    }

    /// Number of replaces since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
