//! SQLite store for the series library.
//!
//! Holds the persisted hierarchy the library reconciles against:
//!
//! - **Groups** ([`SeriesGroup`]): one per intellectual property, mirroring
//!   the display attributes and download status of their main series.
//! - **Series** ([`Series`]): one provider's view of a work, unique on
//!   `(source, external_id)`.
//! - **Books** and **Chapters** under a series, and **Releases** under
//!   exactly one book or chapter ([`ReleaseParent`]).
//!
//! Nothing here is ever hard-deleted by a refresh; entities carry a `deleted`
//! flag instead. Deleting a series cascades to its books, chapters and their
//! releases.

mod db;
pub mod entity;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::entity::{
    Book, BookId, Chapter, ChapterId, DownloadStatus, GroupId, NotificationKind, Release, ReleaseId, ReleaseParent,
    Series, SeriesGroup, SeriesId, StoredNotification,
};
pub use crate::repo::{Repository, Transaction};
