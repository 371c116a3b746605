use super::MetadataProvider;
use crate::error::Result;
use crate::models::FetchedSeries;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Wraps a provider so consecutive calls are at least `interval` apart.
///
/// Callers queue on an async mutex, so the limit holds across every task
/// sharing the same wrapper (e.g. a whole batch refresh).
pub struct RateLimited<P> {
    inner: P,
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}
impl<P> RateLimited<P> {
    pub fn new(inner: P, interval: Duration) -> Self {
        Self { inner, interval, next_slot: Mutex::new(None) }
    }

    /// Allow at most `requests` calls per minute.
    pub fn per_minute(inner: P, requests: u32) -> Self {
        let interval = Duration::from_secs(60).checked_div(requests.max(1)).unwrap_or(Duration::ZERO);
        Self::new(inner, interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    async fn wait_for_slot(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot
            && slot > Instant::now()
        {
            sleep_until(slot).await;
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

#[async_trait]
impl<P: MetadataProvider> MetadataProvider for RateLimited<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, external_id: &str) -> Result<Option<FetchedSeries>> {
        self.wait_for_slot().await;
        self.inner.fetch(external_id).await
    }
}
