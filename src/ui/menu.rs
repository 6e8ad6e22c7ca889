//! The interactive category-toggle menu.

use crate::catalog::Catalog;
use crate::config::Configuration;
use crate::error::Result;

use super::{Prompt, PromptOption, PromptType, UserInterface};

/// Prompt key of the category multi-select (`RIGUP_PROMPT_CATEGORIES`).
pub const MENU_KEY: &str = "categories";

/// Prompt key of the go/no-go confirmation (`RIGUP_PROMPT_CONFIRM`).
pub const MENU_CONFIRM_KEY: &str = "confirm";

/// Let the user toggle categories, then confirm.
///
/// Categories enabled in `current` start checked. Returns the chosen
/// configuration, or `None` when nothing was selected or the user declined.
pub fn choose_categories(
    ui: &mut dyn UserInterface,
    catalog: &Catalog,
    current: &Configuration,
) -> Result<Option<Configuration>> {
    let options = catalog
        .categories()
        .iter()
        .map(|c| PromptOption {
            label: format!("{} ({} tools)", c.title, c.steps.len()),
            value: c.name.clone(),
        })
        .collect();
    let names = catalog.names();
    let preselected = current.enabled_of(&names).join(",");

    let answer = ui.prompt(&Prompt {
        key: MENU_KEY.to_string(),
        question: "Select categories to install (space toggles, enter confirms)".to_string(),
        prompt_type: PromptType::MultiSelect { options },
        default: Some(preselected),
    })?;
    let selected = answer.as_strings().map(<[String]>::to_vec).unwrap_or_default();

    if selected.is_empty() {
        ui.warning("No categories selected, nothing to do");
        return Ok(None);
    }

    let configuration = Configuration::builder(names.iter().copied())
        .only(&selected)?
        .build();

    let proceed = ui.prompt(&Prompt {
        key: MENU_CONFIRM_KEY.to_string(),
        question: format!(
            "Install {} categor{}?",
            selected.len(),
            if selected.len() == 1 { "y" } else { "ies" }
        ),
        prompt_type: PromptType::Confirm,
        default: Some("yes".to_string()),
    })?;

    if proceed.as_bool() == Some(true) {
        Ok(Some(configuration))
    } else {
        Ok(None)
    }
}
