//! Categories of install steps.

use crate::steps::InstallStep;

/// A named, independently toggleable group of steps.
///
/// `enabled` is the only field that changes, and only before a run starts.
#[derive(Debug)]
pub struct Category {
    pub name: String,
    pub title: String,
    pub steps: Vec<InstallStep>,
    pub enabled: bool,
}

impl Category {
    /// An enabled category.
    pub fn new(name: impl Into<String>, title: impl Into<String>, steps: Vec<InstallStep>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            steps,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
