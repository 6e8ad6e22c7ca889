//! The aggregate outcome of a run.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::steps::executor::serialize_secs;
use crate::steps::{RunResult, StepOutcome};

/// Counts, timing and per-step results for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Wall-clock time of the whole run, pre-flight included.
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,

    pub log_location: PathBuf,

    /// Whether actions were only described.
    pub dry_run: bool,

    pub results: Vec<RunResult>,

    /// Categories that were disabled, in run order.
    pub skipped_categories: Vec<String>,
}

impl Summary {
    pub fn new(
        results: Vec<RunResult>,
        skipped_categories: Vec<String>,
        duration: Duration,
        log_location: PathBuf,
        dry_run: bool,
    ) -> Self {
        let count = |outcome: StepOutcome| results.iter().filter(|r| r.outcome == outcome).count();

        Self {
            total_steps: results.len(),
            succeeded: count(StepOutcome::Succeeded),
            skipped: count(StepOutcome::SkippedAlreadyPresent),
            failed: count(StepOutcome::Failed),
            duration,
            log_location,
            dry_run,
            results,
            skipped_categories,
        }
    }

    /// Failed results, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &RunResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == StepOutcome::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// One line of counts, e.g. `12 steps: 3 installed, 8 already present, 1 failed`.
    pub fn counts_line(&self) -> String {
        let installed = if self.dry_run {
            "would install"
        } else {
            "installed"
        };
        format!(
            "{} step{}: {} {}, {} already present, {} failed",
            self.total_steps,
            if self.total_steps == 1 { "" } else { "s" },
            self.succeeded,
            installed,
            self.skipped,
            self.failed
        )
    }
}
