//! Download status derivation.
//!
//! [`derive_status`] classifies a series from its book set. The inputs are
//! first reduced to one [`BookFacts`] per live book, then [`classify`] walks
//! the transition table below, first match wins:
//!
//! | Publishing status              | Condition                  | Result            |
//! |--------------------------------|----------------------------|-------------------|
//! | any                            | nothing downloaded         | `None`            |
//! | Completed, Cancelled           | all downloaded             | `Completed`       |
//! | Completed, Cancelled           | all released downloaded    | `FullyContinuing` |
//! | Completed, Cancelled           | all released-in-language   | `Continuing`      |
//! | Ongoing                        | all released downloaded    | `FullyContinuing` |
//! | Ongoing                        | all released-in-language   | `Continuing`      |
//! | Stalled, Hiatus, Unknown       | all downloaded             | `Stalled`         |
//! | Stalled, Hiatus, Unknown       | all released downloaded    | `FullyContinuing` |
//! | Stalled, Hiatus, Unknown       | all released-in-language   | `Continuing`      |
//! | any                            | otherwise                  | `Missing`         |
//!
//! "All" over an empty set is `false`: a series with no released books is
//! never fully continuing.

use lnauto_metadata::{Language, PublishingStatus};
use lnauto_store::{Book, BookId, DownloadStatus, Release, ReleaseParent, Series, SeriesGroup};
use std::collections::HashMap;
use time::Date;

/// What status derivation needs to know about one book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookFacts {
    pub downloaded: bool,
    /// The book has a release date, and it is not in the future.
    pub released: bool,
    /// At least one live release in the preferred language is out.
    pub released_in_language: bool,
}
impl BookFacts {
    /// Reduce live books and their live releases to facts.
    ///
    /// Soft-deleted books and releases don't count; chapter releases are
    /// ignored.
    pub fn collect(books: &[Book], releases: &[Release], language: Language, today: Date) -> Vec<Self> {
        let mut earliest: HashMap<BookId, Date> = HashMap::new();
        for release in releases.iter().filter(|r| !r.deleted && r.attrs.language == Some(language)) {
            if let (ReleaseParent::Book(book_id), Some(date)) = (release.parent, release.attrs.release_date) {
                earliest.entry(book_id).and_modify(|d| *d = (*d).min(date)).or_insert(date);
            }
        }
        books
            .iter()
            .filter(|book| !book.deleted)
            .map(|book| Self {
                downloaded: book.downloaded,
                released: book.attrs.is_released(today),
                released_in_language: earliest.get(&book.id).is_some_and(|d| *d <= today),
            })
            .collect()
    }
}

fn all_downloaded<'a>(mut books: impl Iterator<Item = &'a BookFacts>) -> bool {
    let mut seen = false;
    let all = books.all(|b| {
        seen = true;
        b.downloaded
    });
    seen && all
}

/// Walk the transition table.
pub fn classify(books: &[BookFacts], publishing: PublishingStatus) -> DownloadStatus {
    if !books.iter().any(|b| b.downloaded) {
        return DownloadStatus::None;
    }
    let everything = all_downloaded(books.iter());
    let released = all_downloaded(books.iter().filter(|b| b.released));
    let released_in_language = all_downloaded(books.iter().filter(|b| b.released_in_language));

    use PublishingStatus as P;
    match publishing {
        P::Completed | P::Cancelled if everything => DownloadStatus::Completed,
        P::Stalled | P::Hiatus | P::Unknown if everything => DownloadStatus::Stalled,
        _ if released => DownloadStatus::FullyContinuing,
        _ if released_in_language => DownloadStatus::Continuing,
        _ => DownloadStatus::Missing,
    }
}

/// Classify a series from its books and their releases.
pub fn derive_status(
    books: &[Book],
    releases: &[Release],
    publishing: PublishingStatus,
    language: Language,
    today: Date,
) -> DownloadStatus {
    classify(&BookFacts::collect(books, releases, language, today), publishing)
}

/// Copy a series' status onto its group, if it is the group's main series.
///
/// Returns whether the group changed.
pub fn propagate(series: &Series, group: &mut SeriesGroup) -> bool {
    if !group.is_main(series.id) || group.download_status == series.download_status {
        return false;
    }
    group.download_status = series.download_status;
    true
}
