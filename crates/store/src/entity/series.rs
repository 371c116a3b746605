use super::{DownloadStatus, GroupId, SeriesId};
use lnauto_metadata::models::SeriesAttrs;

/// One provider's view of a work.
///
/// Everything the provider reports lives in [`SeriesAttrs`] and is replaced
/// wholesale on every refresh; the remaining fields are owned locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub id: SeriesId,
    /// Name of the provider this series was fetched from.
    pub source: Option<String>,
    pub group_id: Option<GroupId>,
    pub attrs: SeriesAttrs,
    pub monitored: bool,
    pub download_status: DownloadStatus,
    pub deleted: bool,
}
impl Series {
    pub fn new(source: impl Into<String>, group_id: Option<GroupId>, attrs: SeriesAttrs) -> Self {
        Self {
            id: SeriesId::new(),
            source: Some(source.into()),
            group_id,
            attrs,
            monitored: true,
            download_status: DownloadStatus::None,
            deleted: false,
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        self.attrs.external_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.attrs.title
    }

    /// The `(source, external_id)` pair this series is merged on, when both
    /// are known.
    pub fn key(&self) -> Option<(&str, &str)> {
        Some((self.source.as_deref()?, self.external_id()?))
    }
}
