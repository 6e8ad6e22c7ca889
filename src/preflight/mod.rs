//! Pre-flight checks: conditions that must hold before any step runs.
//!
//! Checks run cheapest first and stop at the first failure:
//!
//! 1. **disk** - free space on the home filesystem meets the threshold
//! 2. **network** - a TCP connection to the probe address succeeds
//! 3. **privilege** - not root, `sudo` is on PATH and `sudo -v` succeeds
//!
//! A failure is a [`RigupError::Preflight`]; the run is aborted with exit
//! code 1 and no step is attempted.

mod host;

pub use host::{HostInspector, SystemInspector};

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{Result, RigupError};
use crate::session::RunLog;

/// Bytes in one GB as the threshold counts them.
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// One pre-flight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Disk,
    Network,
    Privilege,
}

impl Check {
    /// Run order.
    pub const ALL: [Check; 3] = [Check::Disk, Check::Network, Check::Privilege];
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Check::Disk => "disk",
            Check::Network => "network",
            Check::Privilege => "privilege",
        };
        write!(f, "{}", s)
    }
}

/// Thresholds and targets for the checks.
#[derive(Debug, Clone)]
pub struct PreflightOptions {
    pub min_free_bytes: u64,
    /// Filesystem whose free space is measured.
    pub disk_path: PathBuf,
    pub network_probe: String,
    pub network_timeout: Duration,
}

impl PreflightOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_free_bytes: settings.min_free_disk_gb.saturating_mul(BYTES_PER_GB),
            disk_path: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
            network_probe: settings.network_probe.clone(),
            network_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for PreflightOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Runs the checks in order against an inspector.
pub struct Preflight<'a> {
    inspector: &'a dyn SystemInspector,
    options: PreflightOptions,
}

impl<'a> Preflight<'a> {
    pub fn new(inspector: &'a dyn SystemInspector, options: PreflightOptions) -> Self {
        Self { inspector, options }
    }

    /// Run every check, logging each pass. Stops at the first failure.
    pub fn run(&self, log: &mut RunLog) -> Result<()> {
        for check in Check::ALL {
            match self.check(check) {
                Ok(note) => {
                    tracing::debug!("Pre-flight {} ok: {}", check, note);
                    log.info(&format!("pre-flight {}: {}", check, note));
                }
                Err(message) => {
                    log.error(&format!("pre-flight {} failed: {}", check, message));
                    return Err(RigupError::Preflight {
                        check: check.to_string(),
                        message,
                    });
                }
            }
        }
        Ok(())
    }

    /// Run one check. `Ok` carries a note for the log, `Err` the reason.
    pub fn check(&self, check: Check) -> std::result::Result<String, String> {
        match check {
            Check::Disk => self.check_disk(),
            Check::Network => self.check_network(),
            Check::Privilege => self.check_privilege(),
        }
    }

    fn check_disk(&self) -> std::result::Result<String, String> {
        let path = &self.options.disk_path;
        let free = self
            .inspector
            .free_disk_bytes(path)
            .map_err(|e| format!("cannot read free space on {}: {}", path.display(), e))?;

        if free < self.options.min_free_bytes {
            return Err(format!(
                "{} free on {}, need at least {}",
                format_gb(free),
                path.display(),
                format_gb(self.options.min_free_bytes)
            ));
        }
        Ok(format!("{} free on {}", format_gb(free), path.display()))
    }

    fn check_network(&self) -> std::result::Result<String, String> {
        let probe = &self.options.network_probe;
        if self
            .inspector
            .network_reachable(probe, self.options.network_timeout)
        {
            Ok(format!("{} reachable", probe))
        } else {
            Err(format!(
                "cannot reach {} within {}s; check your internet connection",
                probe,
                self.options.network_timeout.as_secs()
            ))
        }
    }

    fn check_privilege(&self) -> std::result::Result<String, String> {
        if self.inspector.is_root() {
            return Err("run rigup as a regular user with sudo rights, not as root".to_string());
        }
        if !self.inspector.sudo_available() {
            return Err("sudo is not installed or not on PATH".to_string());
        }
        if !self.inspector.sudo_validates() {
            return Err("sudo did not authenticate".to_string());
        }
        Ok("sudo available".to_string())
    }
}

fn format_gb(bytes: u64) -> String {
    format!("{:.1} GB", bytes as f64 / BYTES_PER_GB as f64)
}

/// Scripted inspector for tests.
#[derive(Debug, Clone)]
pub struct MockInspector {
    pub free_bytes: u64,
    pub network: bool,
    pub root: bool,
    pub sudo: bool,
    pub sudo_ok: bool,
}

impl Default for MockInspector {
    /// A healthy machine: 100 GB free, online, regular user with sudo.
    fn default() -> Self {
        Self {
            free_bytes: 100 * BYTES_PER_GB,
            network: true,
            root: false,
            sudo: true,
            sudo_ok: true,
        }
    }
}

impl SystemInspector for MockInspector {
    fn free_disk_bytes(&self, _path: &std::path::Path) -> std::io::Result<u64> {
        Ok(self.free_bytes)
    }

    fn network_reachable(&self, _probe: &str, _timeout: Duration) -> bool {
        self.network
    }

    fn is_root(&self) -> bool {
        self.root
    }

    fn sudo_available(&self) -> bool {
        self.sudo
    }

    fn sudo_validates(&self) -> bool {
        self.sudo_ok
    }
}
