//! Install steps and their execution.
//!
//! - [`InstallStep`] - an identifier, a label and an action
//! - [`StepAction`] / [`InstallAction`] - what performs the install
//! - [`CapabilityProber`] / [`PathProber`] - presence checks
//! - [`StepExecutor`] - probe, run, and turn the outcome into a [`RunResult`]
//!
//! # Example
//!
//! ```
//! use rigup::steps::{InstallAction, InstallStep, StepAction};
//!
//! let step = InstallStep::new(
//!     "jq",
//!     "Command-line JSON processor",
//!     Box::new(InstallAction::Shell {
//!         commands: vec!["sudo apt-get install -y jq".to_string()],
//!     }),
//! );
//! assert_eq!(step.action().describe(), "sudo apt-get install -y jq");
//! ```

pub mod action;
pub mod executor;
pub mod install_step;
pub mod probe;

pub use action::{
    shell_quote, ActionContext, ActionFailure, ActionOutput, ActionResult, FnAction,
    InstallAction, StepAction,
};
pub use executor::{ExecutionOptions, RunResult, StepExecutor, StepOutcome};
pub use install_step::InstallStep;
pub use probe::{CapabilityProber, PathProber};
