//! Configuration schema definitions for rigup.
//!
//! These structs map to the YAML configuration file:
//!
//! ```yaml
//! categories:
//!   databases: false
//! settings:
//!   min_free_disk_gb: 10
//!   network_probe: 1.1.1.1:443
//!   log_dir: /var/tmp/rigup
//!   fetch:
//!     max_attempts: 5
//!     backoff_secs: 3
//! skip_steps: [htop]
//! extra_steps:
//!   - category: system
//!     identifier: tmux
//!     description: Terminal multiplexer
//!     action: { type: apt, packages: [tmux] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::StepDef;
use crate::fetch::RetryPolicy;

/// Root of `config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigupConfig {
    /// Category name to enabled flag. Unlisted categories stay enabled.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, bool>,

    /// Global settings
    pub settings: Settings,

    /// Step identifiers to drop from the catalog
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_steps: Vec<String>,

    /// Steps appended to catalog categories
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_steps: Vec<ExtraStep>,
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum free space on the home filesystem, in GB
    pub min_free_disk_gb: u64,

    /// `host:port` a TCP connection is attempted to during pre-flight
    pub network_probe: String,

    /// Where run logs go (default `~/.rigup/logs`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Download retry settings
    pub fetch: FetchSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_free_disk_gb: default_min_free_disk_gb(),
            network_probe: default_network_probe(),
            log_dir: None,
            fetch: FetchSettings::default(),
        }
    }
}

fn default_min_free_disk_gb() -> u64 {
    5
}

fn default_network_probe() -> String {
    "1.1.1.1:443".to_string()
}

/// Download retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub max_attempts: u32,
    pub backoff_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            backoff_secs: policy.backoff.as_secs(),
        }
    }
}

impl FetchSettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.backoff_secs))
    }
}

/// A step added to a catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraStep {
    pub category: String,
    #[serde(flatten)]
    pub step: StepDef,
}
