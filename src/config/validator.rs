//! Configuration validation rules.
//!
//! - Category flags must name catalog categories
//! - Extra steps must target catalog categories
//! - Retry settings must allow at least one attempt
//! - The network probe must be a `host:port` address

use crate::catalog::Catalog;
use crate::config::schema::RigupConfig;
use crate::error::{Result, RigupError};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
        }
    }
}

/// Validate a configuration against a catalog and return all errors.
///
/// Collects every problem rather than stopping at the first one, so a
/// user can fix a file in one pass.
pub fn validate_config(config: &RigupConfig, catalog: &Catalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for name in config.categories.keys() {
        if !catalog.contains(name) {
            errors.push(ValidationError::new(
                "unknown-category",
                format!(
                    "categories.{} does not name a category (known: {})",
                    name,
                    catalog.names().join(", ")
                ),
            ));
        }
    }

    for extra in &config.extra_steps {
        if !catalog.contains(&extra.category) {
            errors.push(ValidationError::new(
                "unknown-category",
                format!(
                    "extra step '{}' targets unknown category '{}'",
                    extra.step.identifier, extra.category
                ),
            ));
        }
    }

    if config.settings.fetch.max_attempts == 0 {
        errors.push(ValidationError::new(
            "fetch-attempts",
            "settings.fetch.max_attempts must be at least 1".to_string(),
        ));
    }

    let probe = &config.settings.network_probe;
    let has_port = probe
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if !has_port {
        errors.push(ValidationError::new(
            "network-probe",
            format!("settings.network_probe '{}' is not host:port", probe),
        ));
    }

    errors
}

/// Validate and return the first error as a [`RigupError`].
pub fn validate(config: &RigupConfig, catalog: &Catalog) -> Result<()> {
    let errors = validate_config(config, catalog);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Err(RigupError::ConfigValidationError { message })
}
