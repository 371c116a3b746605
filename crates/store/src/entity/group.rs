use super::{DownloadStatus, GroupId, SeriesId};
use lnauto_metadata::models::SeriesAttrs;

/// Canonical identity of one work across providers.
///
/// The group mirrors the display attributes of its main series and carries
/// that series' download status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesGroup {
    pub id: GroupId,
    pub title: String,
    pub description: Option<String>,
    pub img_url: Option<String>,
    pub nsfw_img: bool,
    pub main_series_id: Option<SeriesId>,
    pub download_status: DownloadStatus,
    pub monitored: bool,
}
impl SeriesGroup {
    /// A new, monitored group seeded from fetched series attributes, with no
    /// main series yet.
    pub fn seeded_from(attrs: &SeriesAttrs) -> Self {
        let mut group = Self {
            id: GroupId::new(),
            title: String::new(),
            description: None,
            img_url: None,
            nsfw_img: false,
            main_series_id: None,
            download_status: DownloadStatus::None,
            monitored: true,
        };
        group.mirror(attrs);
        group
    }

    /// Copy the display attributes of a series onto the group.
    pub fn mirror(&mut self, attrs: &SeriesAttrs) {
        self.title.clone_from(&attrs.title);
        self.description.clone_from(&attrs.description);
        self.img_url.clone_from(&attrs.img_url);
        self.nsfw_img = attrs.nsfw_img;
    }

    pub fn is_main(&self, series_id: SeriesId) -> bool {
        self.main_series_id == Some(series_id)
    }
}
