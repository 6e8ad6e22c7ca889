//! Configuration file discovery and loading.
//!
//! One file at most is read:
//! 1. the path given with `--config`, which must exist
//! 2. otherwise `~/.rigup/config.yml`, if present
//! 3. otherwise built-in defaults

use crate::config::schema::RigupConfig;
use crate::error::{Result, RigupError};
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded configuration and the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: RigupConfig,
    /// `None` when defaults were used.
    pub source: Option<PathBuf>,
}

/// `~/.rigup/config.yml`, whether or not it exists.
pub fn user_config_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".rigup").join("config.yml"))
}

/// Pick the file to load, if any.
///
/// # Errors
///
/// Returns `ConfigNotFound` if `explicit` is given and does not exist.
pub fn discover(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(RigupError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(user_config_path().filter(|p| p.exists()))
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<RigupConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RigupError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RigupError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`RigupConfig`].
///
/// An empty document is the default configuration.
pub fn parse_config(content: &str, source_path: &Path) -> Result<RigupConfig> {
    if content.trim().is_empty() {
        return Ok(RigupConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| RigupError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Discover and load the configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    match discover(explicit)? {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            let config = load_config_file(&path)?;
            Ok(LoadedConfig {
                config,
                source: Some(path),
            })
        }
        None => {
            tracing::debug!("No config file, using defaults");
            Ok(LoadedConfig::default())
        }
    }
}
