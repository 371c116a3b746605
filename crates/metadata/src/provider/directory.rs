//! Provider serving snapshots stored as JSON files.

use super::MetadataProvider;
use crate::error::{ErrorKind, Result};
use crate::models::FetchedSeries;
use async_trait::async_trait;
use exn::ResultExt;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

/// Reads `<root>/<external_id>.json`, each file holding one serialized
/// [`FetchedSeries`].
///
/// Useful for seeding a library from exported metadata, and for driving the
/// reconciliation engine without network access.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    name: String,
    root: PathBuf,
}
impl DirectoryProvider {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), root: root.into() }
    }

    fn path_for(&self, external_id: &str) -> Result<PathBuf> {
        // The id becomes a file name: refuse anything that could walk out of the root.
        let valid = !external_id.is_empty()
            && external_id != "."
            && external_id != ".."
            && !external_id.contains(['/', '\\', '\0']);
        if !valid {
            exn::bail!(ErrorKind::InvalidData("external id"));
        }
        Ok(self.root.join(format!("{external_id}.json")))
    }
}

#[async_trait]
impl MetadataProvider for DirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, external_id: &str) -> Result<Option<FetchedSeries>> {
        let path = self.path_for(external_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                tracing::debug!(provider = %self.name, path = %path.display(), "No snapshot for series");
                return Ok(None);
            },
            Err(e) => exn::bail!(ErrorKind::Transport(e.to_string())),
        };
        let fetched = serde_json::from_slice::<FetchedSeries>(&bytes).or_raise(|| ErrorKind::InvalidData("snapshot"))?;
        Ok(Some(fetched))
    }
}
