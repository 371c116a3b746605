//! Error types for the [`reconcile`](super) module.

use derive_more::{Display, Error};
use lnauto_store::GroupId;

/// A reconciliation error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reconcile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why reconciling one series failed.
///
/// ### Caller Errors (not retryable)
/// - [`ErrorKind::UnknownSource`]
/// - [`ErrorKind::SeriesNotFound`]
/// - [`ErrorKind::GroupNotFound`]
/// - [`ErrorKind::Validation`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Provider`] - the metadata provider failed.
/// - [`ErrorKind::Store`] - the transaction was rolled back.
/// - [`ErrorKind::Timeout`] - the transaction (if any) was rolled back.
///
/// ### Invariant Violations
/// - [`ErrorKind::InvalidState`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No provider is registered under this name.
    #[display("unknown metadata source: {_0}")]
    UnknownSource(#[error(not(source))] String),
    /// The provider has nothing under this external id.
    #[display("series not found: {_0}")]
    SeriesNotFound(#[error(not(source))] String),
    /// An explicitly requested group does not exist.
    #[display("series group not found: {_0}")]
    GroupNotFound(#[error(not(source))] GroupId),
    #[display("invalid request: {_0}")]
    Validation(#[error(not(source))] &'static str),
    #[display("metadata provider failed")]
    Provider { retryable: bool },
    #[display("library store failed")]
    Store,
    /// Persisted data breaks an invariant the reconciliation relies on.
    #[display("invalid library state: {_0}")]
    InvalidState(#[error(not(source))] &'static str),
    #[display("reconciliation timed out")]
    Timeout,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable } => *retryable,
            Self::Timeout => true,
            _ => false,
        }
    }
}
