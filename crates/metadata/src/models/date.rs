//! Serde helpers for calendar dates in `YYYY-MM-DD` form.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub(crate) const FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub(crate) mod option {
    use super::FORMAT;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub(crate) fn serialize<S: Serializer>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_some(&date.format(FORMAT).map_err(S::Error::custom)?),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .filter(|s| !s.trim().is_empty())
            .map(|s| Date::parse(s.trim(), FORMAT).map_err(D::Error::custom))
            .transpose()
    }
}
