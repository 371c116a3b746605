mod book;
mod chapter;
mod date;
mod fetched;
mod lang;
mod release;
mod series;
mod status;

pub use self::book::BookAttrs;
pub use self::chapter::ChapterAttrs;
pub use self::fetched::{FetchedBook, FetchedChapter, FetchedSeries};
pub use self::lang::Language;
pub use self::release::ReleaseAttrs;
pub use self::series::{ExternalLink, SeriesAttrs, StaffRole};
pub use self::status::PublishingStatus;
