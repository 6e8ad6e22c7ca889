//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::PathBuf;

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::completions::CompletionsCommand;
use super::list::ListCommand;
use super::run::RunCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command against `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
///
/// Failures travel as [`RigupError`](crate::error::RigupError), so a
/// returned result always carries a success code.
pub struct CommandResult {
    /// Exit code to use.
    pub exit_code: u8,
}

impl CommandResult {
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher; `config_path` is the `--config` override.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    /// Dispatch and execute a command.
    ///
    /// No subcommand means a provisioning run with the top-level flags.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::List(args)) => {
                ListCommand::new(self.config_path.clone(), args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => CompletionsCommand::new(args.clone()).execute(ui),
            None => RunCommand::new(self.config_path.clone(), cli.run.clone()).execute(ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{CompletionsArgs, Commands};
    use crate::ui::MockUI;
    use clap::Parser;
    use clap_complete::Shell;

    #[test]
    fn command_result_success() {
        assert_eq!(CommandResult::success().exit_code, 0);
    }

    #[test]
    fn dispatches_subcommands() {
        let cli = Cli::parse_from(["rigup", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Completions(CompletionsArgs { shell: Shell::Zsh }))
        ));
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(None).dispatch(&cli, &mut ui).unwrap();

        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn run_uses_config_override() {
        let cli = Cli::parse_from(["rigup", "--auto"]);
        let mut ui = MockUI::new();

        let err = CommandDispatcher::new(Some(PathBuf::from("/nonexistent/rigup.yml")))
            .dispatch(&cli, &mut ui)
            .unwrap_err();

        assert!(matches!(err, crate::error::RigupError::ConfigNotFound { .. }));
    }
}
