use super::{Language, StaffRole, date};
use serde::{Deserialize, Serialize};
use time::Date;

/// A volume of a series, as reported by a provider.
///
/// Note that `monitored`/`downloaded` are deliberately absent: they belong to
/// the user and a provider can never change them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookAttrs {
    pub external_id: Option<String>,
    pub title: String,
    pub romaji: Option<String>,
    pub title_orig: Option<String>,
    pub description: Option<String>,
    pub img_url: Option<String>,
    pub language: Option<Language>,
    pub orig_language: Option<Language>,
    /// Original (first) publication date.
    #[serde(with = "date::option")]
    pub release_date: Option<Date>,
    pub authors: Vec<String>,
    pub artists: Vec<String>,
    pub other_staff: Vec<StaffRole>,
    pub sort_order: Option<i64>,
    pub source_url: Option<String>,
    pub nsfw_img: bool,
}
impl BookAttrs {
    pub fn new(external_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            external_id: Some(external_id.into()),
            title: title.into(),
            ..Self::default()
        }
    }

    /// The book has a release date and it is not in the future.
    pub fn is_released(&self, today: Date) -> bool {
        self.release_date.is_some_and(|d| d <= today)
    }
}
