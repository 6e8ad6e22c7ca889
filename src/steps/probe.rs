//! Capability probing: is a tool already on this machine?
//!
//! Every step names one identifier. A plain name (`docker`, `psql`) is
//! looked up on PATH; an identifier containing a `/` is an absolute path
//! checked directly, for tools that install outside PATH.
//!
//! The PATH searched is the process PATH plus the directories installers
//! drop binaries into before the user's shell has been reloaded. Without
//! them a tool installed earlier in the same run (rustup's `~/.cargo/bin`,
//! for instance) would look missing on the next run from the same shell.

use std::path::{Path, PathBuf};

/// Reports whether a tool is present. Absence is a normal answer.
pub trait CapabilityProber {
    fn is_present(&self, identifier: &str) -> bool;
}

/// Directories, relative to home, that installers commonly add to PATH
/// through shell rc files.
const HOME_BIN_DIRS: &[&str] = &[
    ".cargo/bin",
    ".local/bin",
    "go/bin",
    ".nvm/current/bin",
    ".pyenv/bin",
    ".sdkman/candidates/java/current/bin",
];

/// Absolute directories outside the default PATH.
const SYSTEM_BIN_DIRS: &[&str] = &["/usr/local/go/bin", "/snap/bin"];

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that is a regular file with an executable bit.
/// Does NOT shell out to `command -v` or `which`.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// PATH-based prober.
#[derive(Debug, Clone)]
pub struct PathProber {
    entries: Vec<PathBuf>,
}

impl PathProber {
    /// System PATH followed by the well-known install locations.
    pub fn from_env() -> Self {
        let mut entries = parse_system_path();
        let extra = dirs::home_dir()
            .map(|home| {
                HOME_BIN_DIRS
                    .iter()
                    .map(|d| home.join(d))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        for dir in extra
            .into_iter()
            .chain(SYSTEM_BIN_DIRS.iter().map(PathBuf::from))
        {
            if !entries.contains(&dir) {
                entries.push(dir);
            }
        }

        Self { entries }
    }

    /// Search exactly `entries`.
    pub fn with_entries(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    /// Directories searched, in order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Where `identifier` was found, if anywhere.
    pub fn locate(&self, identifier: &str) -> Option<PathBuf> {
        if identifier.contains('/') {
            let path = Path::new(identifier);
            return path.exists().then(|| path.to_path_buf());
        }
        resolve_tool_path(identifier, &self.entries)
    }
}

impl CapabilityProber for PathProber {
    fn is_present(&self, identifier: &str) -> bool {
        let found = self.locate(identifier);
        tracing::debug!("Probe {}: {:?}", identifier, found);
        found.is_some()
    }
}
