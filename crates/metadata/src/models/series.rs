use super::{Language, PublishingStatus, date};
use serde::{Deserialize, Serialize};
use time::Date;

/// A link to the series on some other site (store page, publisher, wiki).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalLink {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Staff member credited with a role other than author/artist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffRole {
    pub name: String,
    pub role: String,
}

/// Series attributes as reported by a single metadata provider.
///
/// Everything here is owned by the provider and is overwritten on every
/// refresh. User-owned state (monitoring, download status, group membership)
/// lives on the persisted entity instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesAttrs {
    /// Provider-scoped identifier of the series.
    pub external_id: Option<String>,
    pub title: String,
    pub romaji: Option<String>,
    pub title_orig: Option<String>,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub publishing_status: PublishingStatus,
    pub external_links: Vec<ExternalLink>,
    #[serde(with = "date::option")]
    pub start_date: Option<Date>,
    #[serde(with = "date::option")]
    pub end_date: Option<Date>,
    pub publishers: Vec<String>,
    pub authors: Vec<String>,
    pub artists: Vec<String>,
    pub other_staff: Vec<StaffRole>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub demographics: Vec<String>,
    pub content_tags: Vec<String>,
    pub language: Option<Language>,
    pub orig_language: Option<Language>,
    /// Cover image.
    pub img_url: Option<String>,
    pub source_url: Option<String>,
    /// Cover image is not safe for work.
    pub nsfw_img: bool,
}
impl SeriesAttrs {
    pub fn new(external_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            external_id: Some(external_id.into()),
            title: title.into(),
            ..Self::default()
        }
    }
}
