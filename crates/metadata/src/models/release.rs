use super::{ExternalLink, Language, date};
use serde::{Deserialize, Serialize};
use time::Date;

/// A concrete, obtainable edition of a book or chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseAttrs {
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub romaji: Option<String>,
    pub description: Option<String>,
    /// Main link to the release (store page, or the chapter itself for web releases).
    pub url: Option<String>,
    /// Edition format, e.g. `"digital"`, `"print"`, `"web"`.
    pub format: Option<String>,
    pub language: Option<Language>,
    #[serde(with = "date::option")]
    pub release_date: Option<Date>,
    pub isbn: Option<String>,
    pub links: Vec<ExternalLink>,
    pub source_url: Option<String>,
}
impl ReleaseAttrs {
    pub fn new(external_id: impl Into<String>, language: Language, release_date: Option<Date>) -> Self {
        Self {
            external_id: Some(external_id.into()),
            language: Some(language),
            release_date,
            ..Self::default()
        }
    }

    /// Released in `language` on or before `today`.
    pub fn is_released_in(&self, language: Language, today: Date) -> bool {
        self.language == Some(language) && self.release_date.is_some_and(|d| d <= today)
    }
}
