use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Publication state of a series as reported by its provider.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishingStatus {
    #[default]
    Unknown,
    Ongoing,
    Completed,
    Hiatus,
    Stalled,
    Cancelled,
}
impl PublishingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Hiatus => "hiatus",
            Self::Stalled => "stalled",
            Self::Cancelled => "cancelled",
        }
    }
}
impl FromStr for PublishingStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "unknown" => Self::Unknown,
            "ongoing" => Self::Ongoing,
            "completed" => Self::Completed,
            "hiatus" => Self::Hiatus,
            "stalled" => Self::Stalled,
            "cancelled" => Self::Cancelled,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "publishing status",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for PublishingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
