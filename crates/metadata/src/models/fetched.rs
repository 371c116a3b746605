use super::{BookAttrs, ChapterAttrs, ReleaseAttrs, SeriesAttrs};
use serde::{Deserialize, Serialize};

/// The complete snapshot a provider returns for one series.
///
/// This is the only shape the reconciliation core ever receives from the
/// outside world: a series, its books (each with releases) and its chapters
/// (each with releases). Any of the lists may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedSeries {
    pub series: SeriesAttrs,
    #[serde(default)]
    pub books: Vec<FetchedBook>,
    #[serde(default)]
    pub chapters: Vec<FetchedChapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedBook {
    #[serde(flatten)]
    pub book: BookAttrs,
    #[serde(default)]
    pub releases: Vec<ReleaseAttrs>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedChapter {
    #[serde(flatten)]
    pub chapter: ChapterAttrs,
    #[serde(default)]
    pub releases: Vec<ReleaseAttrs>,
}

impl FetchedSeries {
    pub fn new(series: SeriesAttrs) -> Self {
        Self { series, books: Vec::new(), chapters: Vec::new() }
    }

    pub fn with_book(mut self, book: BookAttrs, releases: impl IntoIterator<Item = ReleaseAttrs>) -> Self {
        self.books.push(FetchedBook { book, releases: releases.into_iter().collect() });
        self
    }

    pub fn with_chapter(mut self, chapter: ChapterAttrs, releases: impl IntoIterator<Item = ReleaseAttrs>) -> Self {
        self.chapters.push(FetchedChapter { chapter, releases: releases.into_iter().collect() });
        self
    }
}
