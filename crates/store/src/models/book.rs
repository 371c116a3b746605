use super::{from_json, from_language, from_timestamp, to_json, to_timestamp};
use crate::entity::Book;
use crate::error::{Error, Result};
use lnauto_metadata::models::BookAttrs;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) id: String,
    pub(crate) series_id: String,
    pub(crate) external_id: Option<String>,
    pub(crate) title: String,
    pub(crate) romaji: Option<String>,
    pub(crate) title_orig: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) img_url: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) orig_language: Option<String>,
    pub(crate) release_date: Option<i64>,
    pub(crate) authors: String,
    pub(crate) artists: String,
    pub(crate) other_staff: String,
    pub(crate) sort_order: Option<i64>,
    pub(crate) source_url: Option<String>,
    pub(crate) nsfw_img: bool,
    pub(crate) monitored: bool,
    pub(crate) downloaded: bool,
    pub(crate) deleted: bool,
}
impl TryFrom<&Book> for BookRow {
    type Error = Error;
    fn try_from(book: &Book) -> Result<Self> {
        let attrs = &book.attrs;
        Ok(Self {
            id: book.id.to_string(),
            series_id: book.series_id.to_string(),
            external_id: attrs.external_id.clone(),
            title: attrs.title.clone(),
            romaji: attrs.romaji.clone(),
            title_orig: attrs.title_orig.clone(),
            description: attrs.description.clone(),
            img_url: attrs.img_url.clone(),
            language: attrs.language.map(|l| l.as_code().to_string()),
            orig_language: attrs.orig_language.map(|l| l.as_code().to_string()),
            release_date: to_timestamp(attrs.release_date),
            authors: to_json(&attrs.authors, "authors")?,
            artists: to_json(&attrs.artists, "artists")?,
            other_staff: to_json(&attrs.other_staff, "other staff")?,
            sort_order: attrs.sort_order,
            source_url: attrs.source_url.clone(),
            nsfw_img: attrs.nsfw_img,
            monitored: book.monitored,
            downloaded: book.downloaded,
            deleted: book.deleted,
        })
    }
}
impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self> {
        Ok(Self {
            id: row.id.parse()?,
            series_id: row.series_id.parse()?,
            attrs: BookAttrs {
                external_id: row.external_id,
                title: row.title,
                romaji: row.romaji,
                title_orig: row.title_orig,
                description: row.description,
                img_url: row.img_url,
                language: from_language(row.language, "language")?,
                orig_language: from_language(row.orig_language, "original language")?,
                release_date: from_timestamp(row.release_date, "release date")?,
                authors: from_json(&row.authors, "authors")?,
                artists: from_json(&row.artists, "artists")?,
                other_staff: from_json(&row.other_staff, "other staff")?,
                sort_order: row.sort_order,
                source_url: row.source_url,
                nsfw_img: row.nsfw_img,
            },
            monitored: row.monitored,
            downloaded: row.downloaded,
            deleted: row.deleted,
        })
    }
}
