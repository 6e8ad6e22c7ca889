//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::Result;
use crate::runner::Summary;

use super::summary::render_summary;
use super::theme::RigupTheme;
use super::{OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface};

const PROMPT_ENV_PREFIX: &str = "RIGUP_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Output is plain lines with no spinners or colors. Prompts are answered
/// from `RIGUP_PROMPT_<KEY>` environment variables, then the prompt's
/// default, then the empty answer. Never blocks on input.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        if let Some(value) = self.env_overrides.get(&env_key(&prompt.key)) {
            return Ok(PromptResult::parse(&prompt.prompt_type, value));
        }

        if let Some(default) = &prompt.default {
            return Ok(PromptResult::parse(&prompt.prompt_type, default));
        }

        Ok(PromptResult::empty(&prompt.prompt_type))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        println!("  {}", message);
        Box::new(LineSpinner { mode: self.mode })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_status() {
            println!("[{}/{}]", current, total);
        }
    }

    fn show_summary(&mut self, summary: &Summary) {
        println!("{}", render_summary(summary, &RigupTheme::plain()));
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn has_prompt_answer(&self, key: &str) -> bool {
        self.env_overrides.contains_key(&env_key(key))
    }
}

fn env_key(prompt_key: &str) -> String {
    format!("{}{}", PROMPT_ENV_PREFIX, prompt_key.to_uppercase())
}

/// Spinner stand-in that prints one line when the step finishes.
struct LineSpinner {
    mode: OutputMode,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  ✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  ✗ {}", msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  ○ {}", msg);
        }
    }
}
