//! Runs the steps of one category.

use crate::catalog::Category;
use crate::error::{Result, RigupError};
use crate::session::RunLog;
use crate::steps::{ActionContext, RunResult, StepExecutor};

use super::RunProgress;

/// Runs every step of an enabled category in declared order.
///
/// Steps are independent: a failure at one step never stops the next.
pub struct CategoryRunner<'a> {
    executor: &'a StepExecutor<'a>,
    interrupted: fn() -> bool,
}

impl<'a> CategoryRunner<'a> {
    pub fn new(executor: &'a StepExecutor<'a>, interrupted: fn() -> bool) -> Self {
        Self {
            executor,
            interrupted,
        }
    }

    /// Run `category`.
    ///
    /// A disabled category yields no results and only a log note. The one
    /// error is [`RigupError::Interrupted`], checked before every step.
    pub fn run(
        &self,
        category: &Category,
        ctx: &ActionContext<'_>,
        log: &mut RunLog,
        on_progress: &mut dyn FnMut(RunProgress<'_>),
    ) -> Result<Vec<RunResult>> {
        if !category.enabled {
            log.info(&format!("category {}: disabled, skipping", category.name));
            on_progress(RunProgress::CategorySkipped { category });
            return Ok(Vec::new());
        }

        log.info(&format!(
            "category {}: {} step(s)",
            category.name,
            category.steps.len()
        ));

        let total = category.steps.len();
        let mut results = Vec::with_capacity(total);

        for (index, step) in category.steps.iter().enumerate() {
            if (self.interrupted)() {
                log.warn(&format!(
                    "interrupted before {} in category {}",
                    step.identifier(),
                    category.name
                ));
                return Err(RigupError::Interrupted);
            }

            on_progress(RunProgress::StepStarting {
                step,
                category: &category.name,
                index,
                total,
            });

            let step_ctx = ActionContext {
                step: step.identifier(),
                ..*ctx
            };
            let result = self.executor.run(step, &category.name, &step_ctx, log);

            on_progress(RunProgress::StepFinished { result: &result });
            results.push(result);
        }

        Ok(results)
    }
}
