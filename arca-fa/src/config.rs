//! Analysis service configuration
//!
//! Resolved at startup via the common priority order (CLI argument,
//! environment variable, platform config file, compiled defaults). All
//! fields have defaults so a missing config file is not an error.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "ARCA_FA_CONFIG";

/// Configuration for the forensic analysis service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Hard timeout for artifact fetches, in seconds
    pub fetch_timeout_secs: u64,
    /// Maximum artifact size accepted, in bytes
    pub max_artifact_bytes: u64,
    /// User agent sent on artifact fetches
    pub user_agent: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 30,
            max_artifact_bytes: 256 * 1024 * 1024,
            user_agent: format!("arca-fa/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AnalysisConfig {
    /// Fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Load configuration, falling back to defaults when no file resolves
    pub fn load(cli_arg: Option<&str>) -> arca_common::Result<Self> {
        match arca_common::config::resolve_config_path(cli_arg, CONFIG_ENV_VAR, "fa") {
            Some(path) => {
                debug!(path = %path.display(), "Loading analysis config");
                arca_common::config::load_toml(&path)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}
