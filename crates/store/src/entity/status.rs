use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::str::FromStr;

/// How much of a series (or group) the user has downloaded.
///
/// Derived from the book set of a series and its publishing status; see
/// `lnauto_library::status` for the classification itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum DownloadStatus {
    /// Nothing has been downloaded.
    #[default]
    #[display("none")]
    None,
    /// Some books are downloaded but released ones are still missing.
    #[display("missing")]
    Missing,
    /// Every released book in the preferred language is downloaded.
    #[display("continuing")]
    Continuing,
    /// Every released book is downloaded, in any language.
    #[display("fully_continuing")]
    FullyContinuing,
    /// The series is finished and every book is downloaded.
    #[display("completed")]
    Completed,
    /// The series is not progressing and every book is downloaded.
    #[display("stalled")]
    Stalled,
}
impl DownloadStatus {
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Missing,
        Self::Continuing,
        Self::FullyContinuing,
        Self::Completed,
        Self::Stalled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Missing => "missing",
            Self::Continuing => "continuing",
            Self::FullyContinuing => "fully_continuing",
            Self::Completed => "completed",
            Self::Stalled => "stalled",
        }
    }
}
impl FromStr for DownloadStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::from(ErrorKind::InvalidData("download status")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("none", DownloadStatus::None)]
    #[case("missing", DownloadStatus::Missing)]
    #[case("continuing", DownloadStatus::Continuing)]
    #[case("fully_continuing", DownloadStatus::FullyContinuing)]
    #[case("completed", DownloadStatus::Completed)]
    #[case("stalled", DownloadStatus::Stalled)]
    fn test_parse(#[case] input: &str, #[case] expected: DownloadStatus) {
        assert_eq!(input.parse::<DownloadStatus>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("continuing_orig".parse::<DownloadStatus>().is_err());
    }
}
