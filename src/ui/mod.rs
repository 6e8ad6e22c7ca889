//! Interactive user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//! - the category menu, run progress reporting and the summary view
//!
//! # Example
//!
//! ```
//! use rigup::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("rigup");
//! ui.success("Workstation ready");
//! ```

pub mod menu;
pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod prompts;
pub mod spinner;
pub mod summary;
pub mod table;
pub mod terminal;
pub mod theme;

pub use menu::{choose_categories, MENU_CONFIRM_KEY, MENU_KEY};
pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::{format_duration, RunReporter};
pub use prompts::prompt_user;
pub use spinner::ProgressSpinner;
pub use summary::render_summary;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, RigupTheme};

use crate::error::Result;
use crate::runner::Summary;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show progress (e.g., "Category 3 of 6").
    fn show_progress(&mut self, current: usize, total: usize);

    /// Show the end-of-run summary.
    fn show_summary(&mut self, summary: &Summary);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;

    /// Whether the prompt with this key already has an answer supplied
    /// from outside, so it can be asked without a terminal.
    fn has_prompt_answer(&self, _key: &str) -> bool {
        false
    }
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key, used for environment overrides and mock responses.
    pub key: String,
    /// The question to display.
    pub question: String,
    pub prompt_type: PromptType,
    /// Default value if user just presses enter. Multi-select defaults are
    /// comma-separated option values.
    pub default: Option<String>,
}

/// The type of prompt.
#[derive(Debug, Clone)]
pub enum PromptType {
    /// Yes/no confirmation.
    Confirm,
    /// Select any number of options.
    MultiSelect { options: Vec<PromptOption> },
}

/// An option in a select prompt.
#[derive(Debug, Clone)]
pub struct PromptOption {
    /// Display label.
    pub label: String,
    /// Value returned when selected.
    pub value: String,
}

/// Result of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// Boolean result from confirm.
    Bool(bool),
    /// Selected values from multi-select.
    Strings(Vec<String>),
}

impl PromptResult {
    /// Parse a textual answer (mock response, env override, default) for
    /// a prompt of `prompt_type`.
    pub fn parse(prompt_type: &PromptType, text: &str) -> Self {
        match prompt_type {
            PromptType::Confirm => Self::Bool(matches!(
                text.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "1"
            )),
            PromptType::MultiSelect { .. } => Self::Strings(
                text.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        }
    }

    /// The empty answer for a prompt type.
    pub fn empty(prompt_type: &PromptType) -> Self {
        Self::parse(prompt_type, "")
    }

    /// Get as bool if this is a Bool result.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the selections if this is a Strings result.
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Self::Strings(v) => Some(v),
            _ => None,
        }
    }
}
