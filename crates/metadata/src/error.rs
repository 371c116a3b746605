//! Metadata Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A metadata/provider error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider has no series with this external id.
    #[display("series not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The provider does not support the requested operation.
    #[display("operation not implemented by provider")]
    NotImplemented,
    /// Network or I/O failure while talking to the provider.
    #[display("provider transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// The provider answered, but the payload could not be understood.
    #[display("invalid provider data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
