use super::{BookId, SeriesId};
use lnauto_metadata::models::BookAttrs;

/// A volume of a [`Series`](super::Series).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub series_id: SeriesId,
    pub attrs: BookAttrs,
    /// Set by the user; never touched by a metadata refresh.
    pub monitored: bool,
    /// Set by the user (or the download pipeline); never touched by a metadata refresh.
    pub downloaded: bool,
    pub deleted: bool,
}
impl Book {
    pub fn new(series_id: SeriesId, attrs: BookAttrs) -> Self {
        Self {
            id: BookId::new(),
            series_id,
            attrs,
            monitored: true,
            downloaded: false,
            deleted: false,
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        self.attrs.external_id.as_deref()
    }
}
