use serde::{Deserialize, Serialize};

/// A serialized unit of a web-novel-style series.
///
/// Chapters carry no provider id; they are matched on `(number, volume)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterAttrs {
    pub title: String,
    pub author: Option<String>,
    pub number: Option<i64>,
    pub volume: Option<i64>,
    pub description: Option<String>,
}
impl ChapterAttrs {
    pub fn new(title: impl Into<String>, volume: Option<i64>, number: Option<i64>) -> Self {
        Self {
            title: title.into(),
            number,
            volume,
            ..Self::default()
        }
    }

    /// Short `VxN` label used in notifications and logs.
    pub fn label(&self) -> String {
        let fmt = |n: Option<i64>| n.map_or_else(|| "?".to_string(), |n| n.to_string());
        format!("{}x{}", fmt(self.volume), fmt(self.number))
    }
}
