//! Run progress display.

use std::time::Duration;

use crate::runner::RunProgress;
use crate::steps::StepOutcome;

use super::{SpinnerHandle, UserInterface};

/// Turns orchestrator progress events into headers and spinners.
///
/// One spinner is live at a time: it starts with a step and is finished
/// with that step's outcome.
pub struct RunReporter<'a> {
    ui: &'a mut dyn UserInterface,
    spinner: Option<Box<dyn SpinnerHandle>>,
}

impl<'a> RunReporter<'a> {
    pub fn new(ui: &'a mut dyn UserInterface) -> Self {
        Self { ui, spinner: None }
    }

    pub fn handle(&mut self, event: RunProgress<'_>) {
        match event {
            RunProgress::PreflightStarting => {
                self.ui.message("Running pre-flight checks...");
            }
            RunProgress::CategoryStarting {
                category,
                index,
                total,
            } => {
                self.ui.show_header(&category.title);
                self.ui.show_progress(index + 1, total);
            }
            RunProgress::CategorySkipped { category } => {
                self.ui
                    .message(&format!("Skipping {} (disabled)", category.title));
            }
            RunProgress::StepStarting {
                step, index, total, ..
            } => {
                let message = format!(
                    "[{}/{}] {} - {}",
                    index + 1,
                    total,
                    step.identifier(),
                    step.description()
                );
                self.spinner = Some(self.ui.start_spinner(&message));
            }
            RunProgress::StepFinished { result } => {
                let Some(mut spinner) = self.spinner.take() else {
                    return;
                };
                match result.outcome {
                    StepOutcome::Succeeded => match &result.detail {
                        Some(detail) => {
                            spinner.finish_success(&format!("{} ({})", result.step, detail))
                        }
                        None => spinner.finish_success(&format!(
                            "{} ({})",
                            result.step,
                            format_duration(result.duration)
                        )),
                    },
                    StepOutcome::SkippedAlreadyPresent => {
                        spinner.finish_skipped(&format!("{} already present", result.step))
                    }
                    StepOutcome::Failed => spinner.finish_error(&format!(
                        "{} - {}",
                        result.step,
                        result.detail.as_deref().unwrap_or("failed")
                    )),
                }
            }
        }
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}
