//! Row types and their conversions to and from entities.
//!
//! Rows mirror the table columns one-to-one; conversion failures surface as
//! [`ErrorKind::InvalidData`] naming the offending column.

mod book;
mod chapter;
mod group;
mod notification;
mod release;
mod series;

pub(crate) use self::book::BookRow;
pub(crate) use self::chapter::ChapterRow;
pub(crate) use self::group::GroupRow;
pub(crate) use self::notification::NotificationRow;
pub(crate) use self::release::ReleaseRow;
pub(crate) use self::series::SeriesRow;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use lnauto_metadata::Language;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::{Date, UtcDateTime};

pub(crate) fn to_json<T: Serialize>(items: &[T], column: &'static str) -> Result<String> {
    serde_json::to_string(items).or_raise(|| ErrorKind::InvalidData(column))
}

pub(crate) fn from_json<T: DeserializeOwned>(json: &str, column: &'static str) -> Result<Vec<T>> {
    serde_json::from_str(json).or_raise(|| ErrorKind::InvalidData(column))
}

pub(crate) fn to_timestamp(date: Option<Date>) -> Option<i64> {
    date.map(|d| d.midnight().as_utc().unix_timestamp())
}

pub(crate) fn from_timestamp(timestamp: Option<i64>, column: &'static str) -> Result<Option<Date>> {
    timestamp
        .map(|ts| UtcDateTime::from_unix_timestamp(ts).map(|dt| dt.date()).or_raise(|| ErrorKind::InvalidData(column)))
        .transpose()
}

pub(crate) fn from_language(code: Option<String>, column: &'static str) -> Result<Option<Language>> {
    code.map(|c| c.parse::<Language>().or_raise(|| ErrorKind::InvalidData(column))).transpose()
}
