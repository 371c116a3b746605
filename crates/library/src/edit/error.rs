//! Error types for the [`edit`](super) module.

use derive_more::{Display, Error};
use lnauto_store::{BookId, SeriesId};

/// An edit error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for edit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("book not found: {_0}")]
    BookNotFound(#[error(not(source))] BookId),
    #[display("series not found: {_0}")]
    SeriesNotFound(#[error(not(source))] SeriesId),
    #[display("library store failed")]
    Store,
    /// The download status could not be re-derived after the edit.
    #[display("failed to update download status")]
    Status,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
