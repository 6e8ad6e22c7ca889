//! Run command implementation.
//!
//! `rigup` with no subcommand provisions the workstation: load the config,
//! pick categories, check the host, then install what is missing.

use std::path::PathBuf;

use tracing::debug;

use crate::catalog::Catalog;
use crate::cli::args::RunArgs;
use crate::config::{load_config, resolve, CategoryOverrides, Resolved, Settings};
use crate::error::Result;
use crate::fetch::{Fetcher, HttpTransfer};
use crate::preflight::{HostInspector, PreflightOptions};
use crate::runner::Orchestrator;
use crate::session::{default_log_dir, Session};
use crate::steps::{ExecutionOptions, PathProber};
use crate::ui::{
    choose_categories, OutputMode, RunReporter, UserInterface, MENU_CONFIRM_KEY, MENU_KEY,
};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    config_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    pub fn new(config_path: Option<PathBuf>, args: RunArgs) -> Self {
        Self { config_path, args }
    }

    /// Config file settings with command-line overrides applied.
    fn settings(&self, file: &Settings) -> Settings {
        let mut settings = file.clone();
        if let Some(gb) = self.args.min_disk_gb {
            settings.min_free_disk_gb = gb;
        }
        if let Some(dir) = &self.args.log_dir {
            settings.log_dir = Some(dir.clone());
        }
        settings
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = load_config(self.config_path.as_deref())?;
        let verbose = ui.output_mode() == OutputMode::Verbose;
        match &loaded.source {
            Some(path) if verbose => ui.message(&format!("Config: {}", path.display())),
            None if verbose => ui.message("Config: none, using built-in defaults"),
            _ => {}
        }

        let overrides = CategoryOverrides {
            only: self.args.only.clone(),
            skip: self.args.skip.clone(),
        };
        let Resolved {
            catalog,
            mut configuration,
        } = resolve(&loaded.config, Catalog::builtin()?, &overrides)?;

        if !self.args.skips_menu() {
            let answered =
                ui.has_prompt_answer(MENU_KEY) || ui.has_prompt_answer(MENU_CONFIRM_KEY);
            if ui.is_interactive() || answered {
                match choose_categories(ui, &catalog, &configuration)? {
                    Some(chosen) => configuration = chosen,
                    None => {
                        ui.message("Nothing to do.");
                        return Ok(CommandResult::success());
                    }
                }
            } else {
                ui.warning("No terminal available, skipping the category menu and using the configured categories");
            }
        }
        debug!("Enabled categories: {:?}", configuration.enabled_of(&catalog.names()));

        let settings = self.settings(&loaded.config.settings);
        let log_dir = settings.log_dir.clone().unwrap_or_else(default_log_dir);
        let mut session = Session::start(&log_dir)?;
        ui.message(&format!("Logging to {}", session.log.path().display()));
        if self.args.dry_run {
            ui.message("Dry run: nothing will be installed");
        }

        let prober = PathProber::from_env();
        let inspector = HostInspector::new(ui.is_interactive());
        let fetcher = Fetcher::new(Box::new(HttpTransfer::new()?), settings.fetch.policy());
        let orchestrator = Orchestrator::new(
            &prober,
            &inspector,
            &fetcher,
            PreflightOptions::from_settings(&settings),
        )
        .with_options(ExecutionOptions {
            dry_run: self.args.dry_run,
        });

        let outcome = {
            let mut reporter = RunReporter::new(&mut *ui);
            orchestrator.execute(&configuration, catalog.build(), &mut session, |event| {
                reporter.handle(event)
            })
        };

        match outcome {
            Ok(summary) => {
                ui.show_summary(&summary);
                session.finish()?;
                Ok(CommandResult::success())
            }
            Err(e) => {
                ui.message(&format!("Log: {}", session.log.path().display()));
                if let Err(cleanup) = session.finish() {
                    debug!("Failed to remove scratch directory: {}", cleanup);
                }
                Err(e)
            }
        }
    }
}
