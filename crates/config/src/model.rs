use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub providers: ProvidersConfig,
    pub refresh: RefreshConfig,
    pub library: LibraryConfig,
    pub log: LogConfig,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, created on first use.
    pub path: PathBuf,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = crate::project_dirs()
            .map(|dirs| dirs.data_dir().join("library.db"))
            .unwrap_or_else(|| PathBuf::from("library.db"));
        Self { path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Root of the JSON snapshot provider; one subdirectory per source.
    pub snapshots: PathBuf,
    /// Per-source cap on metadata requests.
    pub requests_per_minute: u32,
}
impl Default for ProvidersConfig {
    fn default() -> Self {
        let snapshots = crate::project_dirs()
            .map(|dirs| dirs.data_dir().join("snapshots"))
            .unwrap_or_else(|| PathBuf::from("snapshots"));
        Self { snapshots, requests_per_minute: 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_minutes: u64,
    pub concurrency: usize,
    /// Upper bound on a single series during a batch refresh.
    pub timeout_seconds: Option<u64>,
}
impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_minutes: 6 * 60, concurrency: 4, timeout_seconds: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Provider language code releases must be in to count towards
    /// `continuing`.
    pub language: String,
    pub sweep_chapters: bool,
}
impl Default for LibraryConfig {
    fn default() -> Self {
        Self { language: "en".to_string(), sweep_chapters: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}
