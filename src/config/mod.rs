//! Configuration loading, validation, and the per-run category flags.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! Category flags are resolved once, before a run, in this order (later
//! wins): defaults (everything enabled), the config file, `--only` /
//! `--skip`, and finally the interactive menu. The result is an immutable
//! [`Configuration`].
//!
//! # Example
//!
//! ```
//! use rigup::config::Configuration;
//!
//! let config = Configuration::builder(["system", "languages"])
//!     .only(&["languages".to_string()])
//!     .unwrap()
//!     .build();
//!
//! assert!(!config.is_enabled("system"));
//! assert!(config.is_enabled("languages"));
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{discover, load_config, load_config_file, parse_config, LoadedConfig};
pub use schema::{ExtraStep, FetchSettings, RigupConfig, Settings};
pub use validator::{validate, validate_config, ValidationError};

use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::error::{Result, RigupError};

/// Category name to enabled flag, frozen for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    flags: BTreeMap<String, bool>,
}

impl Configuration {
    /// Every category enabled.
    pub fn all_enabled() -> Self {
        Self::default()
    }

    /// Start from defaults, accepting only the `known` category names.
    pub fn builder<I, S>(known: I) -> ConfigurationBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigurationBuilder {
            known: known.into_iter().map(Into::into).collect(),
            flags: BTreeMap::new(),
        }
    }

    /// Categories not mentioned are enabled.
    pub fn is_enabled(&self, category: &str) -> bool {
        self.flags.get(category).copied().unwrap_or(true)
    }

    /// The subset of `names` that is enabled, in the given order.
    pub fn enabled_of<'a>(&self, names: &[&'a str]) -> Vec<&'a str> {
        names
            .iter()
            .copied()
            .filter(|n| self.is_enabled(n))
            .collect()
    }
}

/// Builds a [`Configuration`], rejecting names the catalog does not have.
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    known: Vec<String>,
    flags: BTreeMap<String, bool>,
}

impl ConfigurationBuilder {
    fn check(&self, name: &str) -> Result<()> {
        if self.known.iter().any(|k| k == name) {
            Ok(())
        } else {
            Err(RigupError::UnknownCategory {
                name: name.to_string(),
            })
        }
    }

    pub fn set(mut self, name: &str, enabled: bool) -> Result<Self> {
        self.check(name)?;
        self.flags.insert(name.to_string(), enabled);
        Ok(self)
    }

    /// Apply a `categories:` map from a config file.
    pub fn apply(mut self, flags: &BTreeMap<String, bool>) -> Result<Self> {
        for (name, enabled) in flags {
            self = self.set(name, *enabled)?;
        }
        Ok(self)
    }

    /// Enable exactly `names`, disabling every other category.
    pub fn only(mut self, names: &[String]) -> Result<Self> {
        for name in names {
            self.check(name)?;
        }
        for known in &self.known {
            let enabled = names.contains(known);
            self.flags.insert(known.clone(), enabled);
        }
        Ok(self)
    }

    /// Disable `names`.
    pub fn skip(mut self, names: &[String]) -> Result<Self> {
        for name in names {
            self = self.set(name, false)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Configuration {
        Configuration { flags: self.flags }
    }
}

/// Category selection given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CategoryOverrides {
    pub only: Vec<String>,
    pub skip: Vec<String>,
}

impl CategoryOverrides {
    pub fn is_empty(&self) -> bool {
        self.only.is_empty() && self.skip.is_empty()
    }
}

/// A catalog customised by a config file, plus the category flags.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub catalog: Catalog,
    pub configuration: Configuration,
}

/// Validate `file`, apply its step edits to `catalog`, then resolve the
/// category flags from the file and `overrides`.
pub fn resolve(
    file: &RigupConfig,
    mut catalog: Catalog,
    overrides: &CategoryOverrides,
) -> Result<Resolved> {
    validate(file, &catalog)?;

    catalog.remove_steps(&file.skip_steps)?;
    for extra in &file.extra_steps {
        catalog.add_step(&extra.category, extra.step.clone())?;
    }

    let mut builder = Configuration::builder(catalog.names()).apply(&file.categories)?;
    if !overrides.only.is_empty() {
        builder = builder.only(&overrides.only)?;
    }
    builder = builder.skip(&overrides.skip)?;

    Ok(Resolved {
        catalog,
        configuration: builder.build(),
    })
}
