//! Category sequencing and run orchestration.
//!
//! Data flows one way: [`Orchestrator`] → [`CategoryRunner`] →
//! [`StepExecutor`](crate::steps::StepExecutor) → prober / fetcher. No step
//! result feeds back into what runs next.

pub mod category;
pub mod orchestrator;
pub mod summary;

pub use category::CategoryRunner;
pub use orchestrator::Orchestrator;
pub use summary::Summary;

use crate::catalog::Category;
use crate::steps::{InstallStep, RunResult};

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// Pre-flight checks are about to run.
    PreflightStarting,
    /// An enabled category is about to run.
    CategoryStarting {
        category: &'a Category,
        index: usize,
        total: usize,
    },
    /// A disabled category was passed over.
    CategorySkipped { category: &'a Category },
    /// A step is about to be probed and, if missing, installed.
    StepStarting {
        step: &'a InstallStep,
        category: &'a str,
        index: usize,
        total: usize,
    },
    /// A step finished.
    StepFinished { result: &'a RunResult },
}
