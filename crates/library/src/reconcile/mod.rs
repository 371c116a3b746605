//! Merging fetched metadata into the library.
//!
//! One reconciliation takes a [`FetchedSeries`](lnauto_metadata::FetchedSeries)
//! from a provider and, inside a single transaction:
//!
//! 1. resolves the [`SeriesGroup`](lnauto_store::SeriesGroup) the series
//!    belongs to, creating one if needed;
//! 2. upserts the series, then each book with its releases, then each chapter
//!    with its releases, keeping fields the user owns;
//! 3. soft-deletes books (and optionally chapters) the fetch no longer lists;
//! 4. re-derives the series' download status and carries it to the group.
//!
//! The primary entry points are [`reconcile`] for one series and
//! [`refresh_all`], which streams [`RefreshEvent`]s for a whole library.

pub mod error;
mod group;
mod merge;
mod series;
mod stream;
mod sweep;

pub use self::merge::{ChangeKind, Record, SeriesParent, pair, upsert};
pub(crate) use self::series::update_status;
pub use self::series::{Outcome, Request, Tally, reconcile};
pub use self::stream::{RefreshEvent, RefreshSummary, refresh_all};
