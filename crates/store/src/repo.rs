//! Reads and writes for the series hierarchy.
//!
//! Every query is written once against a generic [`SqliteExecutor`], then
//! exposed twice: on [`Repository`] for standalone reads against the pool,
//! and on [`Transaction`] for the reads and writes that make up a single
//! reconciliation.

use crate::Database;
use crate::entity::{
    Book, BookId, Chapter, ChapterId, GroupId, NotificationKind, Release, Series, SeriesGroup,
    SeriesId, StoredNotification,
};
use crate::error::{ErrorKind, Result};
use crate::models::{BookRow, ChapterRow, GroupRow, NotificationRow, ReleaseRow, SeriesRow};
use exn::ResultExt;
use sqlx::{Sqlite, SqliteExecutor, SqlitePool};
use std::sync::Arc;
use time::UtcDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};

// =========================================================================
// Queries
// =========================================================================

async fn get_group<'e>(db: impl SqliteExecutor<'e>, id: GroupId) -> Result<Option<SeriesGroup>> {
    let row: Option<GroupRow> = sqlx::query_as(include_str!("../queries/get_group.sql"))
        .bind(id.to_string())
        .fetch_optional(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(SeriesGroup::try_from).transpose()
}

async fn save_group<'e>(db: impl SqliteExecutor<'e>, group: &SeriesGroup) -> Result<()> {
    let row = GroupRow::from(group);
    sqlx::query(include_str!("../queries/upsert_group.sql"))
        .bind(row.id)
        .bind(row.title)
        .bind(row.description)
        .bind(row.img_url)
        .bind(row.nsfw_img)
        .bind(row.main_series_id)
        .bind(row.download_status)
        .bind(row.monitored)
        .execute(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

async fn get_series<'e>(db: impl SqliteExecutor<'e>, id: SeriesId) -> Result<Option<Series>> {
    let row: Option<SeriesRow> = sqlx::query_as(include_str!("../queries/get_series.sql"))
        .bind(id.to_string())
        .fetch_optional(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Series::try_from).transpose()
}

async fn find_series<'e>(db: impl SqliteExecutor<'e>, source: &str, external_id: &str) -> Result<Option<Series>> {
    let row: Option<SeriesRow> = sqlx::query_as(include_str!("../queries/find_series.sql"))
        .bind(source)
        .bind(external_id)
        .fetch_optional(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Series::try_from).transpose()
}

async fn save_series<'e>(db: impl SqliteExecutor<'e>, series: &Series) -> Result<()> {
    let row = SeriesRow::try_from(series)?;
    sqlx::query(include_str!("../queries/upsert_series.sql"))
        .bind(row.id)
        .bind(row.source)
        .bind(row.external_id)
        .bind(row.group_id)
        .bind(row.title)
        .bind(row.romaji)
        .bind(row.title_orig)
        .bind(row.aliases)
        .bind(row.description)
        .bind(row.publishing_status)
        .bind(row.external_links)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.publishers)
        .bind(row.authors)
        .bind(row.artists)
        .bind(row.other_staff)
        .bind(row.genres)
        .bind(row.tags)
        .bind(row.demographics)
        .bind(row.content_tags)
        .bind(row.language)
        .bind(row.orig_language)
        .bind(row.img_url)
        .bind(row.source_url)
        .bind(row.nsfw_img)
        .bind(row.monitored)
        .bind(row.download_status)
        .bind(row.deleted)
        .execute(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

async fn list_series_where<'e>(db: impl SqliteExecutor<'e>, group: Option<GroupId>) -> Result<Vec<Series>> {
    let rows: Vec<SeriesRow> = match group {
        Some(group) => sqlx::query_as::<_, SeriesRow>(include_str!("../queries/list_series_in_group.sql"))
            .bind(group.to_string())
            .fetch_all(db)
            .await,
        None => sqlx::query_as::<_, SeriesRow>(include_str!("../queries/list_series.sql")).fetch_all(db).await,
    }
    .or_raise(|| ErrorKind::Database)?;
    rows.into_iter().map(Series::try_from).collect()
}

async fn get_book<'e>(db: impl SqliteExecutor<'e>, id: BookId) -> Result<Option<Book>> {
    let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/get_book.sql"))
        .bind(id.to_string())
        .fetch_optional(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Book::try_from).transpose()
}

async fn save_book<'e>(db: impl SqliteExecutor<'e>, book: &Book) -> Result<()> {
    let row = BookRow::try_from(book)?;
    sqlx::query(include_str!("../queries/upsert_book.sql"))
        .bind(row.id)
        .bind(row.series_id)
        .bind(row.external_id)
        .bind(row.title)
        .bind(row.romaji)
        .bind(row.title_orig)
        .bind(row.description)
        .bind(row.img_url)
        .bind(row.language)
        .bind(row.orig_language)
        .bind(row.release_date)
        .bind(row.authors)
        .bind(row.artists)
        .bind(row.other_staff)
        .bind(row.sort_order)
        .bind(row.source_url)
        .bind(row.nsfw_img)
        .bind(row.monitored)
        .bind(row.downloaded)
        .bind(row.deleted)
        .execute(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

async fn list_books<'e>(db: impl SqliteExecutor<'e>, series: SeriesId) -> Result<Vec<Book>> {
    let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books.sql"))
        .bind(series.to_string())
        .fetch_all(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    rows.into_iter().map(Book::try_from).collect()
}

async fn save_chapter<'e>(db: impl SqliteExecutor<'e>, chapter: &Chapter) -> Result<()> {
    let row = ChapterRow::from(chapter);
    sqlx::query(include_str!("../queries/upsert_chapter.sql"))
        .bind(row.id)
        .bind(row.series_id)
        .bind(row.title)
        .bind(row.author)
        .bind(row.number)
        .bind(row.volume)
        .bind(row.description)
        .bind(row.deleted)
        .execute(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

async fn list_chapters<'e>(db: impl SqliteExecutor<'e>, series: SeriesId) -> Result<Vec<Chapter>> {
    let rows: Vec<ChapterRow> = sqlx::query_as(include_str!("../queries/list_chapters.sql"))
        .bind(series.to_string())
        .fetch_all(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    rows.into_iter().map(Chapter::try_from).collect()
}

async fn save_release<'e>(db: impl SqliteExecutor<'e>, release: &Release) -> Result<()> {
    let row = ReleaseRow::try_from(release)?;
    sqlx::query(include_str!("../queries/upsert_release.sql"))
        .bind(row.id)
        .bind(row.book_id)
        .bind(row.chapter_id)
        .bind(row.external_id)
        .bind(row.title)
        .bind(row.romaji)
        .bind(row.description)
        .bind(row.url)
        .bind(row.format)
        .bind(row.language)
        .bind(row.release_date)
        .bind(row.isbn)
        .bind(row.links)
        .bind(row.source_url)
        .bind(row.deleted)
        .execute(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

async fn list_releases<'e>(db: impl SqliteExecutor<'e>, series: SeriesId) -> Result<Vec<Release>> {
    let rows: Vec<ReleaseRow> = sqlx::query_as(include_str!("../queries/list_releases_for_series.sql"))
        .bind(series.to_string())
        .fetch_all(db)
        .await
        .or_raise(|| ErrorKind::Database)?;
    rows.into_iter().map(Release::try_from).collect()
}

// =========================================================================
// Repository
// =========================================================================

/// Entry point for everything persisted about the library.
///
/// Reads go straight to the pool. Writes that belong together go through a
/// [`Transaction`] obtained from [`begin`](Self::begin).
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), writer: db.writer() }
    }
}
impl Repository {
    /// Start a write transaction.
    ///
    /// Waits until no other transaction from this process is open; SQLite
    /// only allows one writer, and a deferred transaction that upgrades to a
    /// write lock mid-way would otherwise fail with `SQLITE_BUSY`.
    pub async fn begin(&self) -> Result<Transaction> {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        let tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        Ok(Transaction { tx, _writer: guard })
    }

    pub async fn group(&self, id: GroupId) -> Result<Option<SeriesGroup>> {
        get_group(&self.pool, id).await
    }

    /// Remove a group. Its series are kept, without a group.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, id: GroupId) -> Result<bool> {
        let _writer = self.writer.lock().await;
        let result = sqlx::query(include_str!("../queries/delete_group.sql"))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn series(&self, id: SeriesId) -> Result<Option<Series>> {
        get_series(&self.pool, id).await
    }

    /// Look up a series by the provider it came from and its id there.
    pub async fn series_by_key(&self, source: &str, external_id: &str) -> Result<Option<Series>> {
        find_series(&self.pool, source, external_id).await
    }

    /// Every series that has not been soft-deleted, ordered by title.
    pub async fn list_series(&self) -> Result<Vec<Series>> {
        list_series_where(&self.pool, None).await
    }

    /// Every series in a group, including soft-deleted ones.
    pub async fn series_in_group(&self, group: GroupId) -> Result<Vec<Series>> {
        list_series_where(&self.pool, Some(group)).await
    }

    pub async fn book(&self, id: BookId) -> Result<Option<Book>> {
        get_book(&self.pool, id).await
    }

    /// Every book of a series, including soft-deleted ones.
    pub async fn books(&self, series: SeriesId) -> Result<Vec<Book>> {
        list_books(&self.pool, series).await
    }

    /// Every chapter of a series, including soft-deleted ones.
    pub async fn chapters(&self, series: SeriesId) -> Result<Vec<Chapter>> {
        list_chapters(&self.pool, series).await
    }

    /// Every release under the books and chapters of a series, including
    /// soft-deleted ones.
    pub async fn releases(&self, series: SeriesId) -> Result<Vec<Release>> {
        list_releases(&self.pool, series).await
    }

    // =========================================================================
    // Notification log
    // =========================================================================

    pub async fn record_notification(&self, kind: NotificationKind, message: &str) -> Result<StoredNotification> {
        let created_at = UtcDateTime::now();
        let _writer = self.writer.lock().await;
        let id: i64 = sqlx::query_scalar(include_str!("../queries/insert_notification.sql"))
            .bind(kind.as_str())
            .bind(message)
            .bind(created_at.unix_timestamp())
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(StoredNotification { id, kind, message: message.to_string(), created_at })
    }

    /// The most recent notifications, newest first.
    pub async fn list_notifications(&self, limit: usize) -> Result<Vec<StoredNotification>> {
        let limit = i64::try_from(limit).or_raise(|| ErrorKind::InvalidData("limit"))?;
        let rows: Vec<NotificationRow> = sqlx::query_as(include_str!("../queries/list_notifications.sql"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(StoredNotification::try_from).collect()
    }
}

// =========================================================================
// Transaction
// =========================================================================

/// An open write transaction.
///
/// Dropping it without calling [`commit`](Self::commit) rolls back every
/// write made through it.
pub struct Transaction {
    tx: sqlx::Transaction<'static, Sqlite>,
    // Declared after `tx` so the rollback is queued before the next writer
    // is let in.
    _writer: OwnedMutexGuard<()>,
}
impl Transaction {
    #[instrument("committing transaction", skip(self))]
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.or_raise(|| ErrorKind::Database)?;
        debug!("transaction committed");
        Ok(())
    }

    pub async fn group(&mut self, id: GroupId) -> Result<Option<SeriesGroup>> {
        get_group(&mut *self.tx, id).await
    }

    pub async fn save_group(&mut self, group: &SeriesGroup) -> Result<()> {
        save_group(&mut *self.tx, group).await
    }

    pub async fn series(&mut self, id: SeriesId) -> Result<Option<Series>> {
        get_series(&mut *self.tx, id).await
    }

    pub async fn series_by_key(&mut self, source: &str, external_id: &str) -> Result<Option<Series>> {
        find_series(&mut *self.tx, source, external_id).await
    }

    pub async fn save_series(&mut self, series: &Series) -> Result<()> {
        save_series(&mut *self.tx, series).await
    }

    pub async fn book(&mut self, id: BookId) -> Result<Option<Book>> {
        get_book(&mut *self.tx, id).await
    }

    pub async fn save_book(&mut self, book: &Book) -> Result<()> {
        save_book(&mut *self.tx, book).await
    }

    pub async fn books(&mut self, series: SeriesId) -> Result<Vec<Book>> {
        list_books(&mut *self.tx, series).await
    }

    pub async fn mark_book_deleted(&mut self, id: BookId) -> Result<()> {
        sqlx::query(include_str!("../queries/mark_book_deleted.sql"))
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn save_chapter(&mut self, chapter: &Chapter) -> Result<()> {
        save_chapter(&mut *self.tx, chapter).await
    }

    pub async fn chapters(&mut self, series: SeriesId) -> Result<Vec<Chapter>> {
        list_chapters(&mut *self.tx, series).await
    }

    pub async fn mark_chapter_deleted(&mut self, id: ChapterId) -> Result<()> {
        sqlx::query(include_str!("../queries/mark_chapter_deleted.sql"))
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn save_release(&mut self, release: &Release) -> Result<()> {
        save_release(&mut *self.tx, release).await
    }

    pub async fn releases(&mut self, series: SeriesId) -> Result<Vec<Release>> {
        list_releases(&mut *self.tx, series).await
    }
}
