//! Error types for rigup operations.
//!
//! This module defines [`RigupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Only conditions that stop the whole run are errors: bad configuration,
//!   a failed pre-flight check, or an interrupt
//! - A failing install step is never an error; the step executor turns it
//!   into a [`RunResult`](crate::steps::RunResult)
//! - Use `anyhow::Error` (via `RigupError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rigup operations.
#[derive(Debug, Error)]
pub enum RigupError {
    /// Configuration file not found at the requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration file or the built-in catalog.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A category name that the catalog does not declare.
    #[error("Unknown category: {name}")]
    UnknownCategory { name: String },

    /// A pre-flight check failed; no step was attempted.
    #[error("Pre-flight check '{check}' failed: {message}")]
    Preflight { check: String, message: String },

    /// The run was interrupted by a signal.
    #[error("Interrupted")]
    Interrupted,

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A download exhausted its retries.
    #[error(transparent)]
    Fetch(#[from] crate::fetch::FetchError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RigupError {
    /// Process exit code for this error.
    ///
    /// Interrupts follow the shell convention of 128 + SIGINT.
    pub fn exit_code(&self) -> u8 {
        match self {
            RigupError::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Result type alias for rigup operations.
pub type Result<T> = std::result::Result<T, RigupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = RigupError::ConfigNotFound {
            path: PathBuf::from("/foo/config.yml"),
        };
        assert!(err.to_string().contains("/foo/config.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = RigupError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn unknown_category_displays_name() {
        let err = RigupError::UnknownCategory {
            name: "games".into(),
        };
        assert!(err.to_string().contains("games"));
    }

    #[test]
    fn preflight_displays_check_and_message() {
        let err = RigupError::Preflight {
            check: "disk".into(),
            message: "2.0 GB free, 5 GB required".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("disk"));
        assert!(msg.contains("5 GB required"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = RigupError::CommandFailed {
            command: "apt-get update".into(),
            code: Some(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("apt-get update"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn interrupted_exits_130() {
        assert_eq!(RigupError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn other_errors_exit_1() {
        let err = RigupError::ConfigValidationError {
            message: "bad".into(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: RigupError = io_err.into();
        assert!(matches!(err, RigupError::Io(_)));
    }
}
