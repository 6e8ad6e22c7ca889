//! rigup - Idempotent development workstation provisioning.
//!
//! rigup walks an ordered table of tool categories (system basics, IDEs,
//! containers, cloud SDKs, databases, language runtimes) and installs every
//! tool that is not already on `PATH`. Re-running it is safe: present tools
//! are skipped, and a failing installer never stops the rest of the run.
//!
//! # Modules
//!
//! - [`catalog`] - The built-in category and step table
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, validation, and category flags
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Downloads with bounded retry
//! - [`preflight`] - Disk, network, and privilege checks
//! - [`runner`] - Category sequencing and the run summary
//! - [`session`] - The run log and scratch directory
//! - [`shell`] - Shell command execution and interrupt handling
//! - [`steps`] - Install steps, presence probing, and step execution
//! - [`ui`] - Menu, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use rigup::catalog::Catalog;
//! use rigup::config::{resolve, CategoryOverrides, RigupConfig};
//!
//! let overrides = CategoryOverrides {
//!     only: vec!["languages".to_string()],
//!     skip: vec![],
//! };
//! let resolved = resolve(&RigupConfig::default(), Catalog::builtin().unwrap(), &overrides).unwrap();
//!
//! assert!(resolved.configuration.is_enabled("languages"));
//! assert!(!resolved.configuration.is_enabled("system"));
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod preflight;
pub mod runner;
pub mod session;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{Result, RigupError};
