//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::RigupTheme;
use super::SpinnerHandle;

/// A progress spinner for one step.
pub struct ProgressSpinner {
    bar: ProgressBar,
    indent: usize,
    theme: RigupTheme,
}

impl ProgressSpinner {
    /// Create a spinner indented by `indent` columns.
    pub fn with_indent(message: &str, indent: usize) -> Self {
        let bar = ProgressBar::new_spinner();
        let prefix = " ".repeat(indent);
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template(&format!("{}{{spinner:.cyan}} {{msg}}", prefix))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            indent,
            theme: RigupTheme::detect(),
        }
    }

    fn finish_with(&mut self, line: String) {
        let prefix = " ".repeat(self.indent);
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(format!("{}{}", prefix, line));
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }

    fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_skipped(msg);
        self.finish_with(line);
    }
}
