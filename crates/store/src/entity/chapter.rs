use super::{ChapterId, SeriesId};
use lnauto_metadata::models::ChapterAttrs;

/// A serialized unit of a [`Series`](super::Series), matched on its
/// `(number, volume)` pair rather than an external id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: ChapterId,
    pub series_id: SeriesId,
    pub attrs: ChapterAttrs,
    pub deleted: bool,
}
impl Chapter {
    pub fn new(series_id: SeriesId, attrs: ChapterAttrs) -> Self {
        Self { id: ChapterId::new(), series_id, attrs, deleted: false }
    }
}
