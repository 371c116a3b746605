use crate::entity::StoredNotification;
use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use time::UtcDateTime;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct NotificationRow {
    pub(crate) id: i64,
    pub(crate) kind: String,
    pub(crate) message: String,
    pub(crate) created_at: i64,
}
impl TryFrom<NotificationRow> for StoredNotification {
    type Error = Error;
    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            kind: row.kind.parse()?,
            message: row.message,
            created_at: UtcDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("notification timestamp"))?,
        })
    }
}
