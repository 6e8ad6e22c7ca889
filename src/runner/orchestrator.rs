//! The top-level run: pre-flight, then every category in order.

use std::time::Instant;

use tracing::{info, warn};

use crate::catalog::Category;
use crate::config::Configuration;
use crate::error::{Result, RigupError};
use crate::fetch::Fetcher;
use crate::preflight::{Preflight, PreflightOptions, SystemInspector};
use crate::session::{RunLog, Session};
use crate::shell;
use crate::steps::{ActionContext, CapabilityProber, ExecutionOptions, StepExecutor};

use super::category::CategoryRunner;
use super::summary::Summary;
use super::RunProgress;

/// Drives one invocation.
///
/// Holds its collaborators by reference; nothing in here is mutated by a
/// run, so an orchestrator can be reused.
pub struct Orchestrator<'a> {
    prober: &'a dyn CapabilityProber,
    inspector: &'a dyn SystemInspector,
    fetcher: &'a Fetcher,
    preflight: PreflightOptions,
    options: ExecutionOptions,
    interrupted: fn() -> bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        prober: &'a dyn CapabilityProber,
        inspector: &'a dyn SystemInspector,
        fetcher: &'a Fetcher,
        preflight: PreflightOptions,
    ) -> Self {
        Self {
            prober,
            inspector,
            fetcher,
            preflight,
            options: ExecutionOptions::default(),
            interrupted: shell::interrupted,
        }
    }

    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the SIGINT flag check.
    pub fn with_interrupt_check(mut self, interrupted: fn() -> bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Run pre-flight, apply `config`, then run `categories` in order.
    ///
    /// Per-step failures are reported in the [`Summary`], never as an
    /// error. Errors are a failed pre-flight check (nothing was attempted)
    /// and an interrupt.
    pub fn execute(
        &self,
        config: &Configuration,
        mut categories: Vec<Category>,
        session: &mut Session,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<Summary> {
        let start = Instant::now();
        let log = &mut session.log;

        log.info(&format!("rigup {} starting", env!("CARGO_PKG_VERSION")));
        if self.options.dry_run {
            log.info("dry run: actions are described, not run");
        }

        on_progress(RunProgress::PreflightStarting);
        Preflight::new(self.inspector, self.preflight.clone()).run(log)?;

        for category in &mut categories {
            category.enabled = config.is_enabled(&category.name);
        }
        let categories = categories;

        let executor = StepExecutor::new(self.prober, self.options);
        let runner = CategoryRunner::new(&executor, self.interrupted);
        let ctx = ActionContext {
            step: "",
            fetcher: self.fetcher,
            scratch: session.scratch.path(),
            interrupted: self.interrupted,
        };

        let total = categories.len();
        let mut results = Vec::new();
        let mut skipped_categories = Vec::new();

        for (index, category) in categories.iter().enumerate() {
            if category.enabled {
                on_progress(RunProgress::CategoryStarting {
                    category,
                    index,
                    total,
                });
            } else {
                skipped_categories.push(category.name.clone());
            }

            match runner.run(category, &ctx, log, &mut on_progress) {
                Ok(batch) => results.extend(batch),
                Err(RigupError::Interrupted) => return Err(interrupted(log, results.len())),
                Err(e) => return Err(e),
            }
        }

        // Ctrl-C during the final step is only visible here.
        if (self.interrupted)() {
            return Err(interrupted(log, results.len()));
        }

        let summary = Summary::new(
            results,
            skipped_categories,
            start.elapsed(),
            log.path().to_path_buf(),
            self.options.dry_run,
        );

        info!("{}", summary.counts_line());
        log.info(&summary.counts_line());
        log.record("summary", &summary);

        Ok(summary)
    }
}

fn interrupted(log: &mut RunLog, steps: usize) -> RigupError {
    warn!("Interrupted after {} step(s)", steps);
    log.warn(&format!(
        "run interrupted after {} step(s); the step in progress may be partially installed",
        steps
    ));
    RigupError::Interrupted
}
