//! The append-only run log.
//!
//! Every component writes here: the orchestrator's category notes, the step
//! executor's outcomes, and the full stdout/stderr of every installer. One
//! file per invocation, named after the start time.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::error::Result;

/// Severity of a run log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Append-only log file for a single run.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: File,
    write_failed: bool,
}

impl RunLog {
    /// Create a timestamped log file inside `dir`, creating `dir` if needed.
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!("rigup-{}.log", Local::now().format("%Y%m%d-%H%M%S"));
        Self::open(&dir.join(name))
    }

    /// Open `path` for appending.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_failed: false,
        })
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, msg: &str) {
        self.line(LogLevel::Info, msg);
    }

    pub fn warn(&mut self, msg: &str) {
        self.line(LogLevel::Warn, msg);
    }

    pub fn error(&mut self, msg: &str) {
        self.line(LogLevel::Error, msg);
    }

    /// Write one timestamped line.
    pub fn line(&mut self, level: LogLevel, msg: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let text = format!("[{}] [{}] {}\n", stamp, level, msg);
        self.append(&text);
    }

    /// Append captured installer output verbatim, each line prefixed with
    /// the step it came from.
    pub fn output(&mut self, step: &str, output: &str) {
        if output.trim().is_empty() {
            return;
        }
        let mut text = String::new();
        for line in output.lines() {
            text.push_str(&format!("  {} | {}\n", step, line));
        }
        self.append(&text);
    }

    /// Append a value as a single JSON line.
    pub fn record<T: Serialize>(&mut self, label: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.info(&format!("{} {}", label, json)),
            Err(e) => tracing::warn!("Could not serialize {} for run log: {}", label, e),
        }
    }

    // A log that cannot be written must not stop an install, but the first
    // failure is surfaced so the missing lines are not a mystery.
    fn append(&mut self, text: &str) {
        if let Err(e) = self.file.write_all(text.as_bytes()) {
            if !self.write_failed {
                tracing::warn!("Writing run log {} failed: {}", self.path.display(), e);
                self.write_failed = true;
            }
        }
    }
}

/// Default directory for run logs: `~/.rigup/logs`, or the system temp dir
/// when there is no home directory.
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".rigup").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("rigup-logs"))
}
