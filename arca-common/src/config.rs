//! Configuration file resolution
//!
//! Config values are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file at the platform config location
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use std::path::PathBuf;
use tracing::debug;

/// Resolve the config file path for an ARCA service
///
/// Checks, in order: explicit CLI argument, the given environment variable,
/// then the platform config directory (`~/.config/arca/<service>.toml` on
/// Linux, the equivalent on macOS/Windows).
pub fn resolve_config_path(
    cli_arg: Option<&str>,
    env_var_name: &str,
    service: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Platform config directory
    let candidate = dirs::config_dir().map(|d| d.join("arca").join(format!("{}.toml", service)));
    if let Some(path) = candidate {
        if path.exists() {
            debug!(path = %path.display(), "Using platform config file");
            return Some(path);
        }
    }

    // Priority 4: System-wide location (Linux only)
    if cfg!(target_os = "linux") {
        let system = PathBuf::from(format!("/etc/arca/{}.toml", service));
        if system.exists() {
            return Some(system);
        }
    }

    None
}

/// Read and parse a TOML config file into the given type
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Cannot parse {}: {}", path.display(), e)))
}
