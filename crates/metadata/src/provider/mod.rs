//! Metadata provider trait and implementations.
//!
//! A provider turns an external id into a [`FetchedSeries`] snapshot. The
//! library never cares *how* (HTTP API, scraped site, JSON on disk); it only
//! talks to the [`MetadataProvider`] trait through a [`ProviderHandle`] looked
//! up by name in a [`ProviderRegistry`] that is assembled once at startup.

mod directory;
mod limit;
#[cfg(feature = "mock")]
mod mock;
mod registry;

pub use self::directory::DirectoryProvider;
pub use self::limit::RateLimited;
#[cfg(feature = "mock")]
pub use self::mock::MockProvider;
pub use self::registry::ProviderRegistry;
use crate::error::Result;
use crate::models::FetchedSeries;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared, type-erased provider.
pub type ProviderHandle = Arc<dyn MetadataProvider + Send + Sync>;

/// Unified interface for metadata sources.
///
/// # Errors
/// Implementations report failures with the [`ErrorKind`](crate::error::ErrorKind)
/// that tells the caller what to do about it:
/// - [`NotFound`](crate::error::ErrorKind::NotFound) when the provider
///   positively knows the id does not exist (prefer returning `Ok(None)`).
/// - [`Transport`](crate::error::ErrorKind::Transport) for network/I/O failures
///   (worth retrying on the next scheduled run).
/// - [`NotImplemented`](crate::error::ErrorKind::NotImplemented) when the
///   provider cannot fetch full series trees at all.
///
/// # Examples
///
/// ```
/// use lnauto_metadata::error::Result;
/// use lnauto_metadata::provider::MetadataProvider;
///
/// async fn title_of(provider: &dyn MetadataProvider, id: &str) -> Result<Option<String>> {
///     Ok(provider.fetch(id).await?.map(|fetched| fetched.series.title))
/// }
/// ```
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Name the provider is registered under (e.g. `"ranobedb"`). Stored on
    /// every series it sources, so it must stay stable across restarts.
    fn name(&self) -> &str;

    /// Fetch the full series tree for `external_id`.
    ///
    /// Returns `Ok(None)` when the provider has no such series.
    async fn fetch(&self, external_id: &str) -> Result<Option<FetchedSeries>>;
}
