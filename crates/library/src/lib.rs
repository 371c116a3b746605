//! The ln-auto library core.
//!
//! Reconciles freshly fetched provider metadata into the persisted series
//! tree without losing what the user owns, and derives how much of each
//! series has been downloaded.
//!
//! - [`reconcile::reconcile`] merges one series inside a single transaction.
//! - [`reconcile::refresh_all`] streams a bounded-concurrency refresh of
//!   every known series.
//! - [`edit`] covers the user's side: marking books downloaded or monitored.
//! - [`status`] holds the pure download status classification.

pub mod edit;
pub mod error;
mod lock;
pub mod notify;
pub mod reconcile;
pub mod status;
#[cfg(test)]
mod testing;

pub use crate::lock::{SeriesKey, SeriesLocks};
pub use crate::notify::{Notification, NotificationKind, Notifier};
use lnauto_metadata::Language;
use std::time::Duration;
use time::{Date, OffsetDateTime};

/// How many series a batch refresh works on at once, unless configured.
pub const DEFAULT_REFRESH_CONCURRENCY: usize = 4;

/// Everything an operation needs besides the store and the providers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Releases in this language decide whether a book counts as released
    /// for [`DownloadStatus::Continuing`](lnauto_store::DownloadStatus::Continuing).
    pub language: Language,
    /// Soft-delete chapters that a fetch no longer reports.
    pub sweep_chapters: bool,
    /// Upper bound on series refreshed in parallel by a batch.
    pub concurrency: usize,
    /// Per-series limit on the batch path.
    pub timeout: Option<Duration>,
    pub notifier: Notifier,
    pub locks: SeriesLocks,
    today: Option<Date>,
}
impl Context {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            language: Language::En,
            sweep_chapters: false,
            concurrency: DEFAULT_REFRESH_CONCURRENCY,
            timeout: None,
            notifier,
            locks: SeriesLocks::default(),
            today: None,
        }
    }

    /// Pin the date that release dates are compared against.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> Date {
        self.today.unwrap_or_else(|| OffsetDateTime::now_utc().date())
    }
}
impl Default for Context {
    fn default() -> Self {
        Self::new(Notifier::disabled())
    }
}
