//! Layered configuration for ln-auto.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults.
//! 2. `config.toml`, `config.yaml` and `config.json` in the platform config
//!    directory.
//! 3. An explicit file (format picked by extension).
//! 4. `LNAUTO_*` environment variables, `__` separating sections
//!    (`LNAUTO_REFRESH__CONCURRENCY=8`).

pub mod error;
mod model;

use crate::error::{ErrorKind, Result};
pub use crate::model::{Config, DatabaseConfig, LibraryConfig, LogConfig, ProvidersConfig, RefreshConfig};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use lnauto_metadata::Language;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const ENV_PREFIX: &str = "LNAUTO_";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "ln-auto")
}

impl Config {
    /// Load and validate the configuration from every source.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(explicit))
    }

    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dirs) = project_dirs() {
            let dir = dirs.config_dir();
            debug!(dir = %dir.display(), "looking for configuration files");
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(path) = explicit {
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => figment.merge(Toml::file_exact(path)),
            };
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh.concurrency == 0 {
            exn::bail!(invalid("refresh.concurrency", "must be at least 1"));
        }
        if self.refresh.interval_minutes == 0 {
            exn::bail!(invalid("refresh.interval_minutes", "must be at least 1"));
        }
        if self.refresh.timeout_seconds == Some(0) {
            exn::bail!(invalid("refresh.timeout_seconds", "must be at least 1 when set"));
        }
        if self.providers.requests_per_minute == 0 {
            exn::bail!(invalid("providers.requests_per_minute", "must be at least 1"));
        }
        if let Err(e) = self.library.language.parse::<Language>() {
            exn::bail!(invalid("library.language", e.to_string()));
        }
        Ok(())
    }

    /// Preferred release language; English if the configured code is unknown.
    pub fn language(&self) -> Language {
        self.library.language.parse().unwrap_or(Language::En)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_minutes.saturating_mul(60))
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        self.refresh.timeout_seconds.map(Duration::from_secs)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ErrorKind {
    ErrorKind::Invalid { field, reason: reason.into() }
}
