//! Per-series mutual exclusion.

use derive_more::Display;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// The `(source, external_id)` pair a series is merged on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{source}:{external_id}")]
pub struct SeriesKey {
    pub source: String,
    pub external_id: String,
}
impl SeriesKey {
    pub fn new(source: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self { source: source.into(), external_id: external_id.into() }
    }
}

/// One async mutex per series key, created on demand.
///
/// Holding the guard for a key means no other reconciliation of that series
/// runs in this process. Entries are dropped again once nobody holds or
/// waits on them.
#[derive(Debug, Clone, Default)]
pub struct SeriesLocks {
    locks: Arc<Mutex<HashMap<SeriesKey, Arc<AsyncMutex<()>>>>>,
}
impl SeriesLocks {
    pub async fn lock(&self, key: &SeriesKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Only the map itself references these; nobody is holding or
            // waiting on them.
            locks.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
