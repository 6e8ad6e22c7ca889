//! Interactive terminal UI.

use console::Term;
use std::fmt::Display;
use std::io::Write;

use crate::error::Result;
use crate::runner::Summary;

use super::summary::render_summary;
use super::{
    prompt_user, NonInteractiveUI, OutputMode, ProgressSpinner, Prompt, PromptResult, RigupTheme,
    SpinnerHandle, UserInterface,
};

/// Step spinners sit under their category header.
const SPINNER_INDENT: usize = 2;

/// Colored output, live spinners and dialoguer prompts on stdout.
pub struct TerminalUI {
    term: Term,
    theme: RigupTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            term: Term::stdout(),
            theme: RigupTheme::detect(),
            mode,
        }
    }

    // Status lines are dropped in quiet mode; errors and the summary are not.
    fn status(&mut self, line: impl Display) {
        if self.mode.shows_status() {
            self.line(line);
        }
    }

    fn line(&mut self, line: impl Display) {
        writeln!(self.term, "{}", line).ok();
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.status(msg);
    }

    fn success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.status(line);
    }

    fn warning(&mut self, msg: &str) {
        let line = self.theme.format_warning(msg);
        self.status(line);
    }

    fn error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.line(line);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        prompt_user(prompt, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::with_indent(message, SPINNER_INDENT))
    }

    fn show_header(&mut self, title: &str) {
        let line = format!("\n{}", self.theme.format_header(title));
        self.status(line);
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        let line = format!(
            "  {}",
            self.theme
                .dim
                .apply_to(format!("category {} of {}", current, total))
        );
        self.status(line);
    }

    fn show_summary(&mut self, summary: &Summary) {
        let view = render_summary(summary, &self.theme);
        self.line(view);
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Pick the terminal UI when `interactive` is allowed and stdout is a
/// terminal, the line-based UI otherwise.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
