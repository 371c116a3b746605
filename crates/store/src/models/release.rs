use super::{from_json, from_language, from_timestamp, to_json, to_timestamp};
use crate::entity::{BookId, ChapterId, Release, ReleaseParent};
use crate::error::{Error, ErrorKind, Result};
use lnauto_metadata::models::ReleaseAttrs;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReleaseRow {
    pub(crate) id: String,
    pub(crate) book_id: Option<String>,
    pub(crate) chapter_id: Option<String>,
    pub(crate) external_id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) romaji: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) format: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) release_date: Option<i64>,
    pub(crate) isbn: Option<String>,
    pub(crate) links: String,
    pub(crate) source_url: Option<String>,
    pub(crate) deleted: bool,
}
impl TryFrom<&Release> for ReleaseRow {
    type Error = Error;
    fn try_from(release: &Release) -> Result<Self> {
        let attrs = &release.attrs;
        Ok(Self {
            id: release.id.to_string(),
            book_id: release.parent.book_id().map(|id| id.to_string()),
            chapter_id: release.parent.chapter_id().map(|id| id.to_string()),
            external_id: attrs.external_id.clone(),
            title: attrs.title.clone(),
            romaji: attrs.romaji.clone(),
            description: attrs.description.clone(),
            url: attrs.url.clone(),
            format: attrs.format.clone(),
            language: attrs.language.map(|l| l.as_code().to_string()),
            release_date: to_timestamp(attrs.release_date),
            isbn: attrs.isbn.clone(),
            links: to_json(&attrs.links, "links")?,
            source_url: attrs.source_url.clone(),
            deleted: release.deleted,
        })
    }
}
impl TryFrom<ReleaseRow> for Release {
    type Error = Error;
    fn try_from(row: ReleaseRow) -> Result<Self> {
        let parent = match (row.book_id, row.chapter_id) {
            (Some(book), None) => ReleaseParent::Book(book.parse::<BookId>()?),
            (None, Some(chapter)) => ReleaseParent::Chapter(chapter.parse::<ChapterId>()?),
            _ => exn::bail!(ErrorKind::Constraint("release must belong to exactly one book or chapter")),
        };
        Ok(Self {
            id: row.id.parse()?,
            parent,
            attrs: ReleaseAttrs {
                external_id: row.external_id,
                title: row.title,
                romaji: row.romaji,
                description: row.description,
                url: row.url,
                format: row.format,
                language: from_language(row.language, "language")?,
                release_date: from_timestamp(row.release_date, "release date")?,
                isbn: row.isbn,
                links: from_json(&row.links, "links")?,
                source_url: row.source_url,
            },
            deleted: row.deleted,
        })
    }
}
