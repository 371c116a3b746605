//! Provider registry assembled from the snapshot directory.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use lnauto_metadata::ProviderRegistry;
use lnauto_metadata::provider::{DirectoryProvider, RateLimited};
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Register one rate limited [`DirectoryProvider`] per subdirectory of
/// `root`, named after the subdirectory.
pub async fn load_providers(root: &Path, requests_per_minute: u32) -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            warn!(root = %root.display(), "snapshot directory does not exist, no metadata sources available");
            return Ok(registry);
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::Providers),
    };
    while let Some(entry) = entries.next_entry().await.or_raise(|| ErrorKind::Providers)? {
        if !entry.file_type().await.or_raise(|| ErrorKind::Providers)?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %entry.path().display(), "skipping snapshot directory with a non UTF-8 name");
            continue;
        };
        debug!(source = %name, "registering snapshot provider");
        registry.register(RateLimited::per_minute(DirectoryProvider::new(name, entry.path()), requests_per_minute));
    }
    Ok(registry)
}
