use crate::error::{Error, ErrorKind};
use derive_more::Display;
use exn::ResultExt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
        pub struct $name(Uuid);
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }
        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
        impl FromStr for $name {
            type Err = Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).or_raise(|| ErrorKind::InvalidData($label))
            }
        }
    };
}

typed_id!(
    /// Identifies a [`SeriesGroup`](super::SeriesGroup).
    GroupId,
    "group id"
);
typed_id!(
    /// Identifies a [`Series`](super::Series).
    SeriesId,
    "series id"
);
typed_id!(
    /// Identifies a [`Book`](super::Book).
    BookId,
    "book id"
);
typed_id!(
    /// Identifies a [`Chapter`](super::Chapter).
    ChapterId,
    "chapter id"
);
typed_id!(
    /// Identifies a [`Release`](super::Release).
    ReleaseId,
    "release id"
);
