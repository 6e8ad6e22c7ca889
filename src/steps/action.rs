//! Install actions.
//!
//! An action is the opaque "do the install" part of a step. It reports
//! through its return value: `Ok` with captured output, or `Err` with a
//! message and whatever output the installer produced. It never panics and
//! never returns a [`RigupError`](crate::error::RigupError).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fetch::Fetcher;
use crate::shell::{execute, CommandOptions, CommandResult};

/// What an action can reach while it runs.
pub struct ActionContext<'a> {
    /// Identifier of the step being installed (used to name downloads).
    pub step: &'a str,
    /// Retry-wrapped downloader.
    pub fetcher: &'a Fetcher,
    /// Scratch directory for downloads, removed at exit.
    pub scratch: &'a Path,
    /// Whether Ctrl-C has been pressed.
    pub interrupted: fn() -> bool,
}

impl ActionContext<'_> {
    /// Fail the action if the user has pressed Ctrl-C.
    pub fn check_interrupt(&self) -> Result<(), ActionFailure> {
        if (self.interrupted)() {
            Err(ActionFailure::new("interrupted"))
        } else {
            Ok(())
        }
    }

    /// Path in the scratch directory for a download belonging to this step.
    ///
    /// Identifiers may be paths, so separators are flattened to keep the
    /// file inside scratch.
    pub fn download_path(&self, suffix: &str) -> std::path::PathBuf {
        let stem: String = self
            .step
            .chars()
            .map(|c| match c {
                c if c.is_ascii_alphanumeric() || c == '-' || c == '.' => c,
                _ => '_',
            })
            .collect();
        self.scratch.join(format!("{}{}", stem, suffix))
    }
}

/// Output of a successful action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    pub output: String,
}

impl ActionOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

/// Why an action failed, with any output it produced before failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    pub message: String,
    pub output: String,
}

impl ActionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            output: String::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Result returned by every action.
pub type ActionResult = std::result::Result<ActionOutput, ActionFailure>;

/// Something that performs an install.
pub trait StepAction {
    /// One-line description shown by `--dry-run` and `list`.
    fn describe(&self) -> String;

    /// Perform the install.
    fn run(&self, ctx: &ActionContext<'_>) -> ActionResult;
}

/// A closure-backed action, for steps built in code.
pub struct FnAction<F> {
    description: String,
    f: F,
}

impl<F> FnAction<F>
where
    F: Fn(&ActionContext<'_>) -> ActionResult,
{
    pub fn new(description: impl Into<String>, f: F) -> Self {
        Self {
            description: description.into(),
            f,
        }
    }
}

impl<F> StepAction for FnAction<F>
where
    F: Fn(&ActionContext<'_>) -> ActionResult,
{
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn run(&self, ctx: &ActionContext<'_>) -> ActionResult {
        (self.f)(ctx)
    }
}

/// The declarative actions the catalog and config files use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallAction {
    /// Install OS packages with apt-get, refreshing package lists and
    /// trying once more if the first install fails.
    Apt { packages: Vec<String> },

    /// Run shell commands in order, stopping at the first failure.
    Shell { commands: Vec<String> },

    /// Download a vendor install script and run it, then any follow-up
    /// commands.
    Script {
        url: String,
        #[serde(default = "default_interpreter")]
        interpreter: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default)]
        sudo: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        then: Vec<String>,
    },

    /// Download a `.deb` and install it with dpkg.
    Package {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
    },
}

fn default_interpreter() -> String {
    "sh".to_string()
}

impl StepAction for InstallAction {
    fn describe(&self) -> String {
        match self {
            InstallAction::Apt { packages } => {
                format!("sudo apt-get install -y {}", packages.join(" "))
            }
            InstallAction::Shell { commands } => commands.join(" && "),
            InstallAction::Script {
                url,
                interpreter,
                args,
                sudo,
                then,
            } => {
                let runner = if *sudo {
                    format!("sudo {}", interpreter)
                } else {
                    interpreter.clone()
                };
                let mut text = format!("curl {} | {}", url, runner);
                if !args.is_empty() {
                    text.push_str(" -s -- ");
                    text.push_str(&args.join(" "));
                }
                for command in then {
                    text.push_str(" && ");
                    text.push_str(command);
                }
                text
            }
            InstallAction::Package { url, .. } => format!("dpkg -i {}", url),
        }
    }

    fn run(&self, ctx: &ActionContext<'_>) -> ActionResult {
        match self {
            InstallAction::Apt { packages } => install_packages(packages, ctx),
            InstallAction::Shell { commands } => run_commands(commands),
            InstallAction::Script {
                url,
                interpreter,
                args,
                sudo,
                then,
            } => {
                let dest = ctx.download_path("-install.sh");
                ctx.fetcher
                    .fetch(url, &dest)
                    .map_err(|e| ActionFailure::new(e.to_string()))?;
                ctx.check_interrupt()?;

                let mut command = format!("{} {}", interpreter, shell_quote(&dest));
                if *sudo {
                    command = format!("sudo {}", command);
                }
                for arg in args {
                    command.push(' ');
                    command.push_str(&shell_quote(arg));
                }
                let mut commands = vec![command];
                commands.extend(then.iter().cloned());
                run_commands(&commands)
            }
            InstallAction::Package { url, sha256 } => {
                let dest = ctx.download_path(".deb");
                let fetched = match sha256 {
                    Some(digest) => ctx.fetcher.fetch_verified(url, &dest, digest),
                    None => ctx.fetcher.fetch(url, &dest),
                };
                fetched.map_err(|e| ActionFailure::new(e.to_string()))?;
                ctx.check_interrupt()?;

                // dpkg leaves missing dependencies unconfigured; apt resolves them.
                let quoted = shell_quote(&dest);
                run_commands(&[format!(
                    "sudo dpkg -i {} || sudo apt-get install -f -y",
                    quoted
                )])
            }
        }
    }
}

/// Environment every installer command runs with.
fn installer_env() -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string());
    env
}

// Stale or missing package lists are the usual reason a fresh machine
// cannot find a package, so a failed install is retried once after
// `apt-get update`.
// A failure caused by Ctrl-C is not retried.
fn install_packages(packages: &[String], ctx: &ActionContext<'_>) -> ActionResult {
    if packages.is_empty() {
        return Err(ActionFailure::new("no packages listed"));
    }
    let install = format!("sudo apt-get install -y {}", packages.join(" "));
    match run_commands(&[install.as_str()]) {
        Ok(done) => Ok(done),
        Err(first) => {
            if (ctx.interrupted)() {
                return Err(ActionFailure::new("interrupted").with_output(first.output));
            }
            tracing::debug!("{} failed, refreshing package lists", install);
            run_commands(&["sudo apt-get update", install.as_str()]).map_err(|retry| {
                let output = format!("{}\n{}", first.output, retry.output);
                ActionFailure::new(retry.message).with_output(output.trim().to_string())
            })
        }
    }
}

fn run_commands<S: AsRef<str>>(commands: &[S]) -> ActionResult {
    let options = CommandOptions {
        env: installer_env(),
        ..CommandOptions::captured()
    };

    let mut output = String::new();
    for command in commands {
        let command = command.as_ref();
        let result: CommandResult = execute(command, &options)
            .map_err(|e| ActionFailure::new(e.to_string()).with_output(output.clone()))?;

        let text = result.combined_output();
        if !text.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&text);
        }

        if !result.success {
            let code = result
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(
                ActionFailure::new(format!("`{}` exited with {}", command, code))
                    .with_output(output),
            );
        }
    }
    Ok(ActionOutput::new(output))
}

/// Single-quote a value for the shell.
pub fn shell_quote(value: impl AsRef<std::ffi::OsStr>) -> String {
    let text = value.as_ref().to_string_lossy();
    format!("'{}'", text.replace('\'', r"'\''"))
}
