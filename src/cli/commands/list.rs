//! List command implementation.
//!
//! The `rigup list` command prints the catalog, after config edits, with
//! whether each tool is already on the machine. Nothing is installed.

use std::path::PathBuf;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::cli::args::ListArgs;
use crate::config::{load_config, resolve, CategoryOverrides};
use crate::error::{Result, RigupError};
use crate::steps::{CapabilityProber, PathProber};
use crate::ui::{RigupTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// One category as listed.
#[derive(Debug, Serialize)]
pub struct ListedCategory {
    pub name: String,
    pub title: String,
    pub enabled: bool,
    pub steps: Vec<ListedStep>,
}

/// One step as listed.
#[derive(Debug, Serialize)]
pub struct ListedStep {
    pub identifier: String,
    pub description: String,
    pub present: bool,
}

/// The list command implementation.
pub struct ListCommand {
    config_path: Option<PathBuf>,
    args: ListArgs,
}

impl ListCommand {
    pub fn new(config_path: Option<PathBuf>, args: ListArgs) -> Self {
        Self { config_path, args }
    }

    /// Probe every step of the configured catalog.
    pub fn inventory(&self, prober: &dyn CapabilityProber) -> Result<Vec<ListedCategory>> {
        let loaded = load_config(self.config_path.as_deref())?;
        let resolved = resolve(
            &loaded.config,
            Catalog::builtin()?,
            &CategoryOverrides::default(),
        )?;

        let listed = resolved
            .catalog
            .categories()
            .iter()
            .map(|category| ListedCategory {
                name: category.name.clone(),
                title: category.title.clone(),
                enabled: resolved.configuration.is_enabled(&category.name),
                steps: category
                    .steps
                    .iter()
                    .map(|step| ListedStep {
                        identifier: step.identifier.clone(),
                        description: step.description.clone(),
                        present: prober.is_present(&step.identifier),
                    })
                    .filter(|step| !(self.args.missing && step.present))
                    .collect(),
            })
            .collect();

        Ok(listed)
    }

    fn render(&self, ui: &mut dyn UserInterface, listed: &[ListedCategory]) {
        let theme = RigupTheme::detect();

        for category in listed {
            let title = if category.enabled {
                theme.format_header(&category.title)
            } else {
                format!(
                    "{} {}",
                    theme.format_header(&category.title),
                    theme.dim.apply_to("(disabled)")
                )
            };
            ui.message(&title);

            if category.steps.is_empty() {
                ui.message(&format!("  {}", theme.dim.apply_to("nothing missing")));
            }
            for step in &category.steps {
                let line = format!("{:<26} {}", step.identifier, step.description);
                if step.present {
                    ui.message(&format!("  {}", theme.format_success(&line)));
                } else {
                    ui.message(&format!("  {}", theme.format_skipped(&line)));
                }
            }
            ui.message("");
        }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let listed = self.inventory(&PathProber::from_env())?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&listed)
                .map_err(|e| RigupError::Other(e.into()))?;
            println!("{}", json);
        } else {
            self.render(ui, &listed);
        }

        Ok(CommandResult::success())
    }
}
