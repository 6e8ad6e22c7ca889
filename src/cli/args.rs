//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Running `rigup` without a
//! subcommand provisions the workstation, so the run flags live at the top
//! level.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// rigup - Idempotent development workstation provisioning.
#[derive(Debug, Parser)]
#[command(name = "rigup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ~/.rigup/config.yml)
    #[arg(short, long, global = true, env = "RIGUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show verbose output, including which config file was loaded
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the catalog and which tools are already present
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for a provisioning run.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Skip the category menu and run with the configured categories
    #[arg(long)]
    pub auto: bool,

    /// Run only these categories (comma-separated, implies no menu)
    #[arg(long, value_delimiter = ',', value_name = "CATEGORY")]
    pub only: Vec<String>,

    /// Skip these categories (comma-separated, implies no menu)
    #[arg(long, value_delimiter = ',', value_name = "CATEGORY")]
    pub skip: Vec<String>,

    /// Describe what would be installed without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Minimum free disk space in GB (default 5)
    #[arg(long, value_name = "GB")]
    pub min_disk_gb: Option<u64>,

    /// Directory for the run log (default ~/.rigup/logs)
    #[arg(long, value_name = "DIR", env = "RIGUP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Whether the category menu should be skipped.
    pub fn skips_menu(&self) -> bool {
        self.auto || !self.only.is_empty() || !self.skip.is_empty()
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Show only tools that are not installed yet
    #[arg(long)]
    pub missing: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
