//! Soft-deletion of children the provider no longer reports.

use crate::reconcile::error::{ErrorKind, Result};
use exn::ResultExt;
use lnauto_store::{Book, BookId, Chapter, ChapterId, SeriesId, Transaction};
use std::collections::HashSet;

/// A chapter's merge key.
pub(crate) type ChapterPosition = (Option<i64>, Option<i64>);

/// Live books with an external id that is absent from `fetched`.
///
/// Books without an external id can't be matched against a fetch, so they
/// are never selected.
pub(crate) fn missing_books<'a>(books: &'a [Book], fetched: &HashSet<String>) -> impl Iterator<Item = &'a Book> {
    books
        .iter()
        .filter(|book| !book.deleted)
        .filter(move |book| book.external_id().is_some_and(|id| !fetched.contains(id)))
}

/// Live chapters whose `(number, volume)` is absent from `fetched`.
pub(crate) fn missing_chapters<'a>(
    chapters: &'a [Chapter],
    fetched: &HashSet<ChapterPosition>,
) -> impl Iterator<Item = &'a Chapter> {
    chapters
        .iter()
        .filter(|chapter| !chapter.deleted)
        .filter(move |chapter| !fetched.contains(&(chapter.attrs.number, chapter.attrs.volume)))
}

pub(crate) async fn sweep_missing_books(
    tx: &mut Transaction,
    series_id: SeriesId,
    fetched: &HashSet<String>,
) -> Result<Vec<BookId>> {
    let books = tx.books(series_id).await.or_raise(|| ErrorKind::Store)?;
    let missing: Vec<BookId> = missing_books(&books, fetched).map(|book| book.id).collect();
    for id in &missing {
        tx.mark_book_deleted(*id).await.or_raise(|| ErrorKind::Store)?;
    }
    Ok(missing)
}

pub(crate) async fn sweep_missing_chapters(
    tx: &mut Transaction,
    series_id: SeriesId,
    fetched: &HashSet<ChapterPosition>,
) -> Result<Vec<ChapterId>> {
    let chapters = tx.chapters(series_id).await.or_raise(|| ErrorKind::Store)?;
    let missing: Vec<ChapterId> = missing_chapters(&chapters, fetched).map(|chapter| chapter.id).collect();
    for id in &missing {
        tx.mark_chapter_deleted(*id).await.or_raise(|| ErrorKind::Store)?;
    }
    Ok(missing)
}
