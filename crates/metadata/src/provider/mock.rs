//! In-memory metadata provider for testing.

use super::MetadataProvider;
use crate::error::{ErrorKind, Result};
use crate::models::FetchedSeries;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

enum Entry {
    Snapshot(FetchedSeries),
    Failure(ErrorKind),
}

/// In-memory metadata provider for testing.
///
/// Snapshots are stored behind a [`RwLock`] so tests can swap what the
/// "remote" reports between two reconciliations of the same series.
pub struct MockProvider {
    name: String,
    entries: RwLock<HashMap<String, Entry>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}
impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_series(mut self, external_id: impl Into<String>, fetched: FetchedSeries) -> Self {
        self.entries.get_mut().insert(external_id.into(), Entry::Snapshot(fetched));
        self
    }

    /// Simulate a slow remote; every fetch sleeps for `delay` first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace (or add) what the provider reports for `external_id`.
    pub async fn set(&self, external_id: impl Into<String>, fetched: FetchedSeries) {
        self.entries.write().await.insert(external_id.into(), Entry::Snapshot(fetched));
    }

    /// Make every fetch of `external_id` fail with `kind`.
    pub async fn fail(&self, external_id: impl Into<String>, kind: ErrorKind) {
        self.entries.write().await.insert(external_id.into(), Entry::Failure(kind));
    }

    pub async fn remove(&self, external_id: &str) {
        self.entries.write().await.remove(external_id);
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
impl Default for MockProvider {
    fn default() -> Self {
        Self::new("mock")
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, external_id: &str) -> Result<Option<FetchedSeries>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.entries.read().await.get(external_id) {
            Some(Entry::Snapshot(fetched)) => Ok(Some(fetched.clone())),
            Some(Entry::Failure(kind)) => Err(exn::Exn::from(kind.clone())),
            None => Ok(None),
        }
    }
}
