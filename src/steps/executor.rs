//! Step execution engine.
//!
//! Runs one install step: probe, invoke, record. Whatever the action does,
//! the caller gets a [`RunResult`] back; a failing installer is data, not
//! an error.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::session::RunLog;
use crate::steps::action::ActionContext;
use crate::steps::install_step::InstallStep;
use crate::steps::probe::CapabilityProber;
use crate::ui::format_duration;

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The action ran and succeeded.
    Succeeded,

    /// The tool was already present; the action was not invoked.
    SkippedAlreadyPresent,

    /// The action ran and failed.
    Failed,
}

impl StepOutcome {
    /// Get a display character for this outcome.
    pub fn display_char(&self) -> char {
        match self {
            StepOutcome::Succeeded => '✓',
            StepOutcome::SkippedAlreadyPresent => '○',
            StepOutcome::Failed => '✗',
        }
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepOutcome::Succeeded => "succeeded",
            StepOutcome::SkippedAlreadyPresent => "already present",
            StepOutcome::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Result of running one step.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Step identifier.
    pub step: String,

    /// Category the step belongs to.
    pub category: String,

    /// How the step ended.
    pub outcome: StepOutcome,

    /// Failure message, or the dry-run description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Time spent in the action.
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl RunResult {
    /// Create a skipped result.
    pub fn skipped(step: &str, category: &str) -> Self {
        Self {
            step: step.to_string(),
            category: category.to_string(),
            outcome: StepOutcome::SkippedAlreadyPresent,
            detail: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a success result.
    pub fn succeeded(step: &str, category: &str, duration: Duration) -> Self {
        Self {
            step: step.to_string(),
            category: category.to_string(),
            outcome: StepOutcome::Succeeded,
            detail: None,
            duration,
        }
    }

    /// Create a failure result.
    pub fn failed(step: &str, category: &str, duration: Duration, error: String) -> Self {
        Self {
            step: step.to_string(),
            category: category.to_string(),
            outcome: StepOutcome::Failed,
            detail: Some(error),
            duration,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let c = self.outcome.display_char();
        match self.outcome {
            StepOutcome::Succeeded => {
                format!("{} {} ({})", c, self.step, format_duration(self.duration))
            }
            StepOutcome::SkippedAlreadyPresent => format!("{} {} (already present)", c, self.step),
            StepOutcome::Failed => {
                let error = self.detail.as_deref().unwrap_or("unknown error");
                format!("{} {} - {}", c, self.step, error)
            }
        }
    }
}

pub(crate) fn serialize_secs<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Options for step execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionOptions {
    /// Describe actions instead of running them.
    pub dry_run: bool,
}

/// Runs steps against a prober, logging everything to the run log.
pub struct StepExecutor<'a> {
    prober: &'a dyn CapabilityProber,
    options: ExecutionOptions,
}

impl<'a> StepExecutor<'a> {
    pub fn new(prober: &'a dyn CapabilityProber, options: ExecutionOptions) -> Self {
        Self { prober, options }
    }

    /// Run a single step of `category`.
    ///
    /// 1. Present on the system: skipped, the action is not invoked.
    /// 2. Dry run: the action is described, not invoked.
    /// 3. Otherwise the action runs; its output goes to the log and its
    ///    failure, if any, becomes a `Failed` result.
    pub fn run(
        &self,
        step: &InstallStep,
        category: &str,
        ctx: &ActionContext<'_>,
        log: &mut RunLog,
    ) -> RunResult {
        let id = step.identifier();

        if self.prober.is_present(id) {
            debug!("{} already present", id);
            log.info(&format!("{}: already present, skipping", id));
            return RunResult::skipped(id, category);
        }

        if self.options.dry_run {
            let description = step.action().describe();
            log.info(&format!("{}: dry run, would run: {}", id, description));
            return RunResult::succeeded(id, category, Duration::ZERO)
                .with_detail(format!("would run: {}", description));
        }

        log.info(&format!("{}: installing ({})", id, step.description()));
        let start = Instant::now();
        let outcome = step.action().run(ctx);
        let duration = start.elapsed();

        match outcome {
            Ok(done) => {
                log.output(id, &done.output);
                log.info(&format!("{}: installed in {}", id, format_duration(duration)));
                info!("Installed {}", id);
                RunResult::succeeded(id, category, duration)
            }
            Err(failure) => {
                log.output(id, &failure.output);
                log.error(&format!("{}: {}", id, failure.message));
                warn!("Installing {} failed: {}", id, failure.message);
                RunResult::failed(id, category, duration, failure.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Fetcher, RetryPolicy, Transfer};
    use crate::steps::action::{ActionFailure, ActionOutput, FnAction};
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct SetProber(HashSet<&'static str>);

    impl CapabilityProber for SetProber {
        fn is_present(&self, identifier: &str) -> bool {
            self.0.contains(identifier)
        }
    }

    struct NoTransfer;

    impl Transfer for NoTransfer {
        fn transfer(&self, _url: &str, _dest: &Path) -> anyhow::Result<()> {
            anyhow::bail!("offline")
        }
    }

    struct Fixture {
        temp: TempDir,
        fetcher: Fetcher,
        log: RunLog,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let log = RunLog::create(temp.path()).unwrap();
        let fetcher = Fetcher::new(Box::new(NoTransfer), RetryPolicy::default());
        Fixture { temp, fetcher, log }
    }

    fn counting_step(id: &str, calls: &Rc<Cell<u32>>, fail: bool) -> InstallStep {
        let calls = Rc::clone(calls);
        InstallStep::new(
            id,
            "test step",
            Box::new(FnAction::new("count", move |_ctx: &ActionContext<'_>| {
                calls.set(calls.get() + 1);
                if fail {
                    Err(ActionFailure::new("exit 1").with_output("E: Unable to locate package"))
                } else {
                    Ok(ActionOutput::new("Setting up tool"))
                }
            })),
        )
    }

    #[test]
    fn present_tool_is_skipped_without_running_action() {
        let mut fx = fixture();
        let prober = SetProber(HashSet::from(["git"]));
        let executor = StepExecutor::new(&prober, ExecutionOptions::default());
        let calls = Rc::new(Cell::new(0));
        let step = counting_step("git", &calls, false);
        let ctx = ActionContext {
            step: "git",
            fetcher: &fx.fetcher,
            scratch: fx.temp.path(),
            interrupted: crate::shell::interrupted,
        };

        let result = executor.run(&step, "system", &ctx, &mut fx.log);

        assert_eq!(result.outcome, StepOutcome::SkippedAlreadyPresent);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn missing_tool_runs_action() {
        let mut fx = fixture();
        let prober = SetProber(HashSet::new());
        let executor = StepExecutor::new(&prober, ExecutionOptions::default());
        let calls = Rc::new(Cell::new(0));
        let step = counting_step("jq", &calls, false);
        let ctx = ActionContext {
            step: "jq",
            fetcher: &fx.fetcher,
            scratch: fx.temp.path(),
            interrupted: crate::shell::interrupted,
        };

        let result = executor.run(&step, "system", &ctx, &mut fx.log);

        assert_eq!(result.outcome, StepOutcome::Succeeded);
        assert_eq!(result.category, "system");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failing_action_becomes_failed_result() {
        let mut fx = fixture();
        let prober = SetProber(HashSet::new());
        let executor = StepExecutor::new(&prober, ExecutionOptions::default());
        let calls = Rc::new(Cell::new(0));
        let step = counting_step("redis-server", &calls, true);
        let ctx = ActionContext {
            step: "redis-server",
            fetcher: &fx.fetcher,
            scratch: fx.temp.path(),
            interrupted: crate::shell::interrupted,
        };

        let result = executor.run(&step, "databases", &ctx, &mut fx.log);

        assert_eq!(result.outcome, StepOutcome::Failed);
        assert_eq!(result.detail.as_deref(), Some("exit 1"));
    }

    #[test]
    fn action_output_is_written_to_log() {
        let mut fx = fixture();
        let prober = SetProber(HashSet::new());
        let executor = StepExecutor::new(&prober, ExecutionOptions::default());
        let calls = Rc::new(Cell::new(0));
        let step = counting_step("redis-server", &calls, true);
        let ctx = ActionContext {
            step: "redis-server",
            fetcher: &fx.fetcher,
            scratch: fx.temp.path(),
            interrupted: crate::shell::interrupted,
        };

        executor.run(&step, "databases", &ctx, &mut fx.log);

        let content = std::fs::read_to_string(fx.log.path()).unwrap();
        assert!(content.contains("redis-server | E: Unable to locate package"));
        assert!(content.contains("[ERROR] redis-server: exit 1"));
    }

    #[test]
    fn dry_run_describes_without_running() {
        let mut fx = fixture();
        let prober = SetProber(HashSet::new());
        let executor = StepExecutor::new(&prober, ExecutionOptions { dry_run: true });
        let calls = Rc::new(Cell::new(0));
        let step = counting_step("node", &calls, false);
        let ctx = ActionContext {
            step: "node",
            fetcher: &fx.fetcher,
            scratch: fx.temp.path(),
            interrupted: crate::shell::interrupted,
        };

        let result = executor.run(&step, "languages", &ctx, &mut fx.log);

        assert_eq!(calls.get(), 0);
        assert_eq!(result.outcome, StepOutcome::Succeeded);
        assert_eq!(result.detail.as_deref(), Some("would run: count"));
    }

    #[test]
    fn summary_lines_per_outcome() {
        let ok = RunResult::succeeded("git", "system", Duration::from_millis(1500));
        assert_eq!(ok.summary_line(), "✓ git (1.5s)");

        let skipped = RunResult::skipped("git", "system");
        assert_eq!(skipped.summary_line(), "○ git (already present)");

        let failed = RunResult::failed("git", "system", Duration::ZERO, "exit 100".into());
        assert_eq!(failed.summary_line(), "✗ git - exit 100");
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let result = RunResult::skipped("git", "system");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""outcome":"skipped_already_present""#));
        assert!(json.contains(r#""duration":0.0"#));
    }
}
