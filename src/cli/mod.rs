//! Command-line interface for rigup.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, ListArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
