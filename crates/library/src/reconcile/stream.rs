use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::lock::SeriesKey;
use crate::notify::Notification;
use crate::reconcile::error::{Error as ReconcileError, ErrorKind as ReconcileErrorKind, Result as ReconcileResult};
use crate::reconcile::series::{Outcome, Request, reconcile};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use lnauto_metadata::ProviderRegistry;
use lnauto_store::{Repository, SeriesId};
use std::collections::VecDeque;
use tracing::{info, warn};

/// Progress events emitted by [`refresh_all`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) - exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete) - exactly once, with
///    the number of known series.
/// 3. [`Skipped`](Self::Skipped), [`Refreshed`](Self::Refreshed) and
///    [`Failed`](Self::Failed) - one per series, in completion order.
/// 4. [`Complete`](Self::Complete) - exactly once.
///
/// Only failing to list the known series ends the stream early, as an `Err`.
#[derive(Debug)]
pub enum RefreshEvent {
    Started,
    DiscoveryComplete(u64),
    /// The series has no source or no external id to refresh it by.
    Skipped { series_id: SeriesId, title: String },
    Refreshed(Box<Outcome>),
    /// The series' transaction was rolled back; the batch carries on.
    Failed { key: SeriesKey, error: ReconcileError },
    Complete(RefreshSummary),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
    pub skipped: usize,
}
impl RefreshSummary {
    /// The notification sent once a batch is done.
    pub fn notification(&self) -> Notification {
        let message = format!(
            "Library refresh finished: {} refreshed, {} failed, {} skipped.",
            self.refreshed, self.failed, self.skipped
        );
        if self.failed > 0 { Notification::error(message) } else { Notification::success(message) }
    }
}

/// Re-fetch and reconcile every known series.
///
/// Series are refreshed concurrently, at most [`Context::concurrency`] at a
/// time, each bounded by [`Context::timeout`] when set. A failing series is
/// reported as [`RefreshEvent::Failed`] and never stops its siblings. When
/// the batch is done a summary notification is sent through
/// [`Context::notifier`].
pub fn refresh_all<'a>(
    repo: &'a Repository,
    providers: &'a ProviderRegistry,
    ctx: &'a Context,
) -> impl Stream<Item = LibraryResult<RefreshEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(RefreshEvent::Started);

        let known = match repo.list_series().await.or_raise(|| LibraryErrorKind::Refresh) {
            Ok(series) => series,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        yield Ok(RefreshEvent::DiscoveryComplete(u64::try_from(known.len()).unwrap_or(u64::MAX)));

        let mut summary = RefreshSummary::default();
        let mut pending = VecDeque::with_capacity(known.len());
        for series in known {
            match series.key() {
                Some((source, external_id)) => {
                    pending.push_back(refresh_one(repo, providers, ctx, Request::new(source, external_id)));
                },
                None => {
                    warn!(series = %series.id, title = series.title(), "series has no source or external id, skipping");
                    summary.skipped += 1;
                    yield Ok(RefreshEvent::Skipped { series_id: series.id, title: series.title().to_string() });
                },
            }
        }

        let mut processing = FuturesUnordered::new();
        processing.extend(pending.drain(..ctx.concurrency.max(1).min(pending.len())));
        while let Some((key, result)) = processing.next().await {
            match result {
                Ok(outcome) => {
                    summary.refreshed += 1;
                    yield Ok(RefreshEvent::Refreshed(Box::new(outcome)));
                },
                Err(error) => {
                    warn!(%key, ?error, "failed to refresh series");
                    summary.failed += 1;
                    yield Ok(RefreshEvent::Failed { key, error });
                },
            }
            if let Some(next) = pending.pop_front() {
                processing.push(next);
            }
        }

        info!(refreshed = summary.refreshed, failed = summary.failed, skipped = summary.skipped, "library refresh finished");
        ctx.notifier.send(summary.notification());
        yield Ok(RefreshEvent::Complete(summary));
    })
}

async fn refresh_one(
    repo: &Repository,
    providers: &ProviderRegistry,
    ctx: &Context,
    request: Request,
) -> (SeriesKey, ReconcileResult<Outcome>) {
    let work = reconcile(repo, providers, ctx, &request);
    let result = match ctx.timeout {
        // Dropping the unfinished reconciliation drops its open transaction,
        // which rolls it back.
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .unwrap_or_else(|_| Err(ReconcileError::from(ReconcileErrorKind::Timeout))),
        None => work.await,
    };
    (request.key(), result)
}
