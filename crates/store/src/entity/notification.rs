use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::str::FromStr;
use time::UtcDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NotificationKind {
    #[display("info")]
    Info,
    #[display("success")]
    Success,
    #[display("error")]
    Error,
}
impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}
impl FromStr for NotificationKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            _ => exn::bail!(ErrorKind::InvalidData("notification kind")),
        }
    }
}

/// A notification that has been written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNotification {
    pub id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: UtcDateTime,
}
