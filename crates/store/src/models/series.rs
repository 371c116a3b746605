use super::{from_json, from_language, from_timestamp, to_json, to_timestamp};
use crate::entity::{GroupId, Series};
use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use lnauto_metadata::models::{PublishingStatus, SeriesAttrs};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SeriesRow {
    pub(crate) id: String,
    pub(crate) source: Option<String>,
    pub(crate) external_id: Option<String>,
    pub(crate) group_id: Option<String>,
    pub(crate) title: String,
    pub(crate) romaji: Option<String>,
    pub(crate) title_orig: Option<String>,
    pub(crate) aliases: String,
    pub(crate) description: Option<String>,
    pub(crate) publishing_status: String,
    pub(crate) external_links: String,
    pub(crate) start_date: Option<i64>,
    pub(crate) end_date: Option<i64>,
    pub(crate) publishers: String,
    pub(crate) authors: String,
    pub(crate) artists: String,
    pub(crate) other_staff: String,
    pub(crate) genres: String,
    pub(crate) tags: String,
    pub(crate) demographics: String,
    pub(crate) content_tags: String,
    pub(crate) language: Option<String>,
    pub(crate) orig_language: Option<String>,
    pub(crate) img_url: Option<String>,
    pub(crate) source_url: Option<String>,
    pub(crate) nsfw_img: bool,
    pub(crate) monitored: bool,
    pub(crate) download_status: String,
    pub(crate) deleted: bool,
}
impl TryFrom<&Series> for SeriesRow {
    type Error = Error;
    fn try_from(series: &Series) -> Result<Self> {
        let attrs = &series.attrs;
        Ok(Self {
            id: series.id.to_string(),
            source: series.source.clone(),
            external_id: attrs.external_id.clone(),
            group_id: series.group_id.map(|id| id.to_string()),
            title: attrs.title.clone(),
            romaji: attrs.romaji.clone(),
            title_orig: attrs.title_orig.clone(),
            aliases: to_json(&attrs.aliases, "aliases")?,
            description: attrs.description.clone(),
            publishing_status: attrs.publishing_status.as_str().to_string(),
            external_links: to_json(&attrs.external_links, "external links")?,
            start_date: to_timestamp(attrs.start_date),
            end_date: to_timestamp(attrs.end_date),
            publishers: to_json(&attrs.publishers, "publishers")?,
            authors: to_json(&attrs.authors, "authors")?,
            artists: to_json(&attrs.artists, "artists")?,
            other_staff: to_json(&attrs.other_staff, "other staff")?,
            genres: to_json(&attrs.genres, "genres")?,
            tags: to_json(&attrs.tags, "tags")?,
            demographics: to_json(&attrs.demographics, "demographics")?,
            content_tags: to_json(&attrs.content_tags, "content tags")?,
            language: attrs.language.map(|l| l.as_code().to_string()),
            orig_language: attrs.orig_language.map(|l| l.as_code().to_string()),
            img_url: attrs.img_url.clone(),
            source_url: attrs.source_url.clone(),
            nsfw_img: attrs.nsfw_img,
            monitored: series.monitored,
            download_status: series.download_status.as_str().to_string(),
            deleted: series.deleted,
        })
    }
}
impl TryFrom<SeriesRow> for Series {
    type Error = Error;
    fn try_from(row: SeriesRow) -> Result<Self> {
        let attrs = SeriesAttrs {
            external_id: row.external_id,
            title: row.title,
            romaji: row.romaji,
            title_orig: row.title_orig,
            aliases: from_json(&row.aliases, "aliases")?,
            description: row.description,
            publishing_status: row
                .publishing_status
                .parse::<PublishingStatus>()
                .or_raise(|| ErrorKind::InvalidData("publishing status"))?,
            external_links: from_json(&row.external_links, "external links")?,
            start_date: from_timestamp(row.start_date, "start date")?,
            end_date: from_timestamp(row.end_date, "end date")?,
            publishers: from_json(&row.publishers, "publishers")?,
            authors: from_json(&row.authors, "authors")?,
            artists: from_json(&row.artists, "artists")?,
            other_staff: from_json(&row.other_staff, "other staff")?,
            genres: from_json(&row.genres, "genres")?,
            tags: from_json(&row.tags, "tags")?,
            demographics: from_json(&row.demographics, "demographics")?,
            content_tags: from_json(&row.content_tags, "content tags")?,
            language: from_language(row.language, "language")?,
            orig_language: from_language(row.orig_language, "original language")?,
            img_url: row.img_url,
            source_url: row.source_url,
            nsfw_img: row.nsfw_img,
        };
        Ok(Self {
            id: row.id.parse()?,
            source: row.source,
            group_id: row.group_id.as_deref().map(str::parse::<GroupId>).transpose()?,
            attrs,
            monitored: row.monitored,
            download_status: row.download_status.parse()?,
            deleted: row.deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DownloadStatus;
    use lnauto_metadata::Language;
    use lnauto_metadata::models::{ExternalLink, StaffRole};
    use time::macros::date;

    #[test]
    fn test_row_to_model() {
        let row = SeriesRow {
            id: "67e55044-10b1-426f-9247-bb680e5fe0c8".to_string(),
            source: Some("ranobedb".to_string()),
            external_id: Some("1337".to_string()),
            group_id: None,
            title: "Mushoku Tensei".to_string(),
            romaji: Some("Mushoku Tensei: Isekai Ittara Honki Dasu".to_string()),
            title_orig: None,
            aliases: r#"["Jobless Reincarnation"]"#.to_string(),
            description: None,
            publishing_status: "completed".to_string(),
            external_links: r#"[{"name":"Official","url":"https://example.org"}]"#.to_string(),
            start_date: Some(1_358_035_200),
            end_date: None,
            publishers: "[]".to_string(),
            authors: r#"["Rifujin na Magonote"]"#.to_string(),
            artists: "[]".to_string(),
            other_staff: r#"[{"name":"Shirotaka","role":"illustrator"}]"#.to_string(),
            genres: r#"["Fantasy"]"#.to_string(),
            tags: "[]".to_string(),
            demographics: "[]".to_string(),
            content_tags: "[]".to_string(),
            language: Some("en".to_string()),
            orig_language: Some("ja".to_string()),
            img_url: None,
            source_url: None,
            nsfw_img: false,
            monitored: true,
            download_status: "fully_continuing".to_string(),
            deleted: false,
        };
        let series = Series::try_from(row).unwrap();
        assert_eq!(series.key(), Some(("ranobedb", "1337")));
        assert_eq!(series.attrs.aliases, ["Jobless Reincarnation"]);
        assert_eq!(series.attrs.publishing_status, PublishingStatus::Completed);
        assert_eq!(series.attrs.start_date, Some(date!(2013 - 01 - 13)));
        assert_eq!(
            series.attrs.external_links,
            [ExternalLink { name: "Official".to_string(), url: "https://example.org".to_string(), icon_url: None }]
        );
        assert_eq!(
            series.attrs.other_staff,
            [StaffRole { name: "Shirotaka".to_string(), role: "illustrator".to_string() }]
        );
        assert_eq!(series.attrs.orig_language, Some(Language::Ja));
        assert_eq!(series.download_status, DownloadStatus::FullyContinuing);
    }

    #[test]
    fn test_model_to_row() {
        let mut attrs = SeriesAttrs::new("1337", "Mushoku Tensei");
        attrs.genres = vec!["Fantasy".to_string()];
        attrs.start_date = Some(date!(2013 - 01 - 13));
        let series = Series::new("ranobedb", None, attrs);
        let row = SeriesRow::try_from(&series).unwrap();
        assert_eq!(row.genres, r#"["Fantasy"]"#);
        assert_eq!(row.start_date, Some(1_358_035_200));
        assert_eq!(row.publishing_status, "unknown");
        assert_eq!(row.download_status, "none");
        assert!(row.monitored);
        assert_eq!(Series::try_from(row).unwrap(), series);
    }

    #[test]
    fn test_invalid_status() {
        let series = Series::new("ranobedb", None, SeriesAttrs::new("1", "x"));
        let mut row = SeriesRow::try_from(&series).unwrap();
        row.publishing_status = "abandoned".to_string();
        let err = Series::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("publishing status")));
    }
}
