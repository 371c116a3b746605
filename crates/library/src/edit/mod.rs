//! Edits to the fields the user owns.
//!
//! A metadata refresh never touches these fields. Changing what has been
//! downloaded re-derives the series' download status (and its group's, for a
//! main series) in the same transaction.

pub mod error;

use self::error::{ErrorKind, Result};
use crate::Context;
use crate::lock::SeriesKey;
use crate::reconcile::update_status;
use exn::{OptionExt, ResultExt};
use lnauto_store::{BookId, DownloadStatus, Repository, Series, SeriesId};
use tokio::sync::OwnedMutexGuard;
use tracing::{info, instrument};

/// Serialize with reconciliations of the same series, when it has a key.
async fn lock_series(ctx: &Context, series: &Series) -> Option<OwnedMutexGuard<()>> {
    let (source, external_id) = series.key()?;
    Some(ctx.locks.lock(&SeriesKey::new(source, external_id)).await)
}

async fn load_series(repo: &Repository, id: SeriesId) -> Result<Series> {
    repo.series(id).await.or_raise(|| ErrorKind::Store)?.ok_or_raise(|| ErrorKind::SeriesNotFound(id))
}

/// Mark one book as downloaded (or not) and return the series' new status.
#[instrument(skip(repo, ctx))]
pub async fn set_book_downloaded(
    repo: &Repository,
    ctx: &Context,
    book_id: BookId,
    downloaded: bool,
) -> Result<DownloadStatus> {
    let book = repo.book(book_id).await.or_raise(|| ErrorKind::Store)?.ok_or_raise(|| ErrorKind::BookNotFound(book_id))?;
    let series = load_series(repo, book.series_id).await?;
    let _guard = lock_series(ctx, &series).await;

    let mut tx = repo.begin().await.or_raise(|| ErrorKind::Store)?;
    let mut book =
        tx.book(book_id).await.or_raise(|| ErrorKind::Store)?.ok_or_raise(|| ErrorKind::BookNotFound(book_id))?;
    let mut series = tx
        .series(book.series_id)
        .await
        .or_raise(|| ErrorKind::Store)?
        .ok_or_raise(|| ErrorKind::SeriesNotFound(book.series_id))?;
    book.downloaded = downloaded;
    tx.save_book(&book).await.or_raise(|| ErrorKind::Store)?;
    let status = update_status(&mut tx, &mut series, ctx).await.or_raise(|| ErrorKind::Status)?;
    tx.commit().await.or_raise(|| ErrorKind::Store)?;
    info!(book = %book_id, %status, "book download state changed");
    Ok(status)
}

/// Monitor (or stop monitoring) one book.
#[instrument(skip(repo))]
pub async fn set_book_monitored(repo: &Repository, book_id: BookId, monitored: bool) -> Result<()> {
    let mut tx = repo.begin().await.or_raise(|| ErrorKind::Store)?;
    let mut book =
        tx.book(book_id).await.or_raise(|| ErrorKind::Store)?.ok_or_raise(|| ErrorKind::BookNotFound(book_id))?;
    book.monitored = monitored;
    tx.save_book(&book).await.or_raise(|| ErrorKind::Store)?;
    tx.commit().await.or_raise(|| ErrorKind::Store)
}

/// Mark every live book of a series as downloaded (or not) and return the
/// series' new status.
#[instrument(skip(repo, ctx))]
pub async fn set_series_downloaded(
    repo: &Repository,
    ctx: &Context,
    series_id: SeriesId,
    downloaded: bool,
) -> Result<DownloadStatus> {
    let series = load_series(repo, series_id).await?;
    let _guard = lock_series(ctx, &series).await;

    let mut tx = repo.begin().await.or_raise(|| ErrorKind::Store)?;
    let mut series =
        tx.series(series_id).await.or_raise(|| ErrorKind::Store)?.ok_or_raise(|| ErrorKind::SeriesNotFound(series_id))?;
    let books = tx.books(series_id).await.or_raise(|| ErrorKind::Store)?;
    for mut book in books.into_iter().filter(|b| !b.deleted && b.downloaded != downloaded) {
        book.downloaded = downloaded;
        tx.save_book(&book).await.or_raise(|| ErrorKind::Store)?;
    }
    let status = update_status(&mut tx, &mut series, ctx).await.or_raise(|| ErrorKind::Status)?;
    tx.commit().await.or_raise(|| ErrorKind::Store)?;
    info!(series = %series_id, %status, "series download state changed");
    Ok(status)
}

/// Monitor (or stop monitoring) a series and every live book in it.
#[instrument(skip(repo))]
pub async fn set_series_monitored(repo: &Repository, series_id: SeriesId, monitored: bool) -> Result<()> {
    let mut tx = repo.begin().await.or_raise(|| ErrorKind::Store)?;
    let mut series =
        tx.series(series_id).await.or_raise(|| ErrorKind::Store)?.ok_or_raise(|| ErrorKind::SeriesNotFound(series_id))?;
    series.monitored = monitored;
    tx.save_series(&series).await.or_raise(|| ErrorKind::Store)?;
    let books = tx.books(series_id).await.or_raise(|| ErrorKind::Store)?;
    for mut book in books.into_iter().filter(|b| !b.deleted && b.monitored != monitored) {
        book.monitored = monitored;
        tx.save_book(&book).await.or_raise(|| ErrorKind::Store)?;
    }
    tx.commit().await.or_raise(|| ErrorKind::Store)
}
