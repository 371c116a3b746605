//! Persisted entities.

mod book;
mod chapter;
mod group;
mod ids;
mod notification;
mod release;
mod series;
mod status;

pub use self::book::Book;
pub use self::chapter::Chapter;
pub use self::group::SeriesGroup;
pub use self::ids::{BookId, ChapterId, GroupId, ReleaseId, SeriesId};
pub use self::notification::{NotificationKind, StoredNotification};
pub use self::release::{Release, ReleaseParent};
pub use self::series::Series;
pub use self::status::DownloadStatus;
