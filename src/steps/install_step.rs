//! Install steps.

use std::fmt;

use super::action::StepAction;

/// One installable unit: a tool, package or SDK.
///
/// Immutable once built.
pub struct InstallStep {
    identifier: String,
    description: String,
    action: Box<dyn StepAction>,
}

impl InstallStep {
    /// Create a step.
    ///
    /// `identifier` is what the prober looks for; `description` is the label
    /// shown to the user.
    pub fn new(
        identifier: impl Into<String>,
        description: impl Into<String>,
        action: Box<dyn StepAction>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
            action,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn action(&self) -> &dyn StepAction {
        self.action.as_ref()
    }
}

impl fmt::Debug for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallStep")
            .field("identifier", &self.identifier)
            .field("description", &self.description)
            .field("action", &self.action.describe())
            .finish()
    }
}
