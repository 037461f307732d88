//! Per-pack request serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};

use crate::parser::PackIdentifier;

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// One async lock per pack identifier.
///
/// Two requests for the same pack would share `{root}/{pack}/`, so the
/// second waits until the first releases its [`PackLease`]. Entries are
/// removed once nobody holds or waits for them.
#[derive(Debug, Clone, Default)]
pub struct PackLocks {
    locks: Arc<LockMap>,
}

impl PackLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive use of `pack_id`.
    #[instrument(skip(self), fields(pack = %pack_id))]
    pub async fn acquire(&self, pack_id: &PackIdentifier) -> PackLease {
        let key = pack_id.as_str().to_string();
        // Clone the Arc so the shard lock is released before awaiting.
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        if lock.try_lock().is_err() {
            debug!("pack busy, waiting for earlier request");
        }
        let guard = lock.lock_owned().await;

        PackLease {
            locks: Arc::clone(&self.locks),
            key,
            guard: Some(guard),
        }
    }

    /// Number of packs currently locked or awaited.
    #[must_use]
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive hold on one pack identifier, released on drop.
#[derive(Debug)]
pub struct PackLease {
    locks: Arc<LockMap>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PackLease {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
