use crate::entity::Chapter;
use crate::error::{Error, Result};
use lnauto_metadata::models::ChapterAttrs;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ChapterRow {
    pub(crate) id: String,
    pub(crate) series_id: String,
    pub(crate) title: String,
    pub(crate) author: Option<String>,
    pub(crate) number: Option<i64>,
    pub(crate) volume: Option<i64>,
    pub(crate) description: Option<String>,
    pub(crate) deleted: bool,
}
impl From<&Chapter> for ChapterRow {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id.to_string(),
            series_id: chapter.series_id.to_string(),
            title: chapter.attrs.title.clone(),
            author: chapter.attrs.author.clone(),
            number: chapter.attrs.number,
            volume: chapter.attrs.volume,
            description: chapter.attrs.description.clone(),
            deleted: chapter.deleted,
        }
    }
}
impl TryFrom<ChapterRow> for Chapter {
    type Error = Error;
    fn try_from(row: ChapterRow) -> Result<Self> {
        Ok(Self {
            id: row.id.parse()?,
            series_id: row.series_id.parse()?,
            attrs: ChapterAttrs {
                title: row.title,
                author: row.author,
                number: row.number,
                volume: row.volume,
                description: row.description,
            },
            deleted: row.deleted,
        })
    }
}
