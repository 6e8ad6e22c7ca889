//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect};

use crate::error::{Result, RigupError};

use super::{Prompt, PromptOption, PromptResult, PromptType};

fn map_dialoguer_err(e: dialoguer::Error) -> RigupError {
    RigupError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user on `term`.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => prompt_confirm(prompt, term),
        PromptType::MultiSelect { options } => prompt_multiselect(prompt, options, term),
    }
}

fn prompt_confirm(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let default = prompt
        .default
        .as_deref()
        .map(|d| PromptResult::parse(&PromptType::Confirm, d) == PromptResult::Bool(true))
        .unwrap_or(true);

    let result = Confirm::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .default(default)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(PromptResult::Bool(result))
}

fn prompt_multiselect(
    prompt: &Prompt,
    options: &[PromptOption],
    term: &Term,
) -> Result<PromptResult> {
    let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
    let defaults = preselected(prompt.default.as_deref(), options);

    let selections = MultiSelect::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .items(&labels)
        .defaults(&defaults)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    let values = selections
        .iter()
        .map(|&i| options[i].value.clone())
        .collect();

    Ok(PromptResult::Strings(values))
}

/// Which options a comma-separated default pre-checks.
fn preselected(default: Option<&str>, options: &[PromptOption]) -> Vec<bool> {
    let values: Vec<&str> = default
        .map(|d| d.split(',').map(str::trim).collect())
        .unwrap_or_default();
    options
        .iter()
        .map(|o| values.contains(&o.value.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<PromptOption> {
        ["system", "ides", "cloud"]
            .iter()
            .map(|v| PromptOption {
                label: v.to_uppercase(),
                value: v.to_string(),
            })
            .collect()
    }

    #[test]
    fn preselected_marks_default_values() {
        assert_eq!(
            preselected(Some("system, cloud"), &options()),
            vec![true, false, true]
        );
    }

    #[test]
    fn preselected_without_default_selects_nothing() {
        assert_eq!(preselected(None, &options()), vec![false, false, false]);
    }

    #[test]
    fn preselected_ignores_unknown_values() {
        assert_eq!(
            preselected(Some("databases"), &options()),
            vec![false, false, false]
        );
    }
}
