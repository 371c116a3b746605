use crate::entity::{SeriesGroup, SeriesId};
use crate::error::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct GroupRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) img_url: Option<String>,
    pub(crate) nsfw_img: bool,
    pub(crate) main_series_id: Option<String>,
    pub(crate) download_status: String,
    pub(crate) monitored: bool,
}
impl From<&SeriesGroup> for GroupRow {
    fn from(group: &SeriesGroup) -> Self {
        Self {
            id: group.id.to_string(),
            title: group.title.clone(),
            description: group.description.clone(),
            img_url: group.img_url.clone(),
            nsfw_img: group.nsfw_img,
            main_series_id: group.main_series_id.map(|id| id.to_string()),
            download_status: group.download_status.as_str().to_string(),
            monitored: group.monitored,
        }
    }
}
impl TryFrom<GroupRow> for SeriesGroup {
    type Error = Error;
    fn try_from(row: GroupRow) -> Result<Self> {
        Ok(Self {
            id: row.id.parse()?,
            title: row.title,
            description: row.description,
            img_url: row.img_url,
            nsfw_img: row.nsfw_img,
            main_series_id: row.main_series_id.as_deref().map(str::parse::<SeriesId>).transpose()?,
            download_status: row.download_status.parse()?,
            monitored: row.monitored,
        })
    }
}
