//! The table of categories and steps rigup knows how to install.
//!
//! The built-in table is embedded from `builtin.yml` at compile time. A
//! configuration file may drop steps from it (`skip_steps`) or append steps
//! to a category (`extra_steps`) before the table is turned into runnable
//! [`Category`] values.
//!
//! # Example
//!
//! ```
//! use rigup::catalog::Catalog;
//!
//! let catalog = Catalog::builtin().unwrap();
//! assert_eq!(
//!     catalog.names(),
//!     vec!["system", "ides", "containers", "cloud", "databases", "languages"]
//! );
//! ```

mod category;

pub use category::Category;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigupError};
use crate::steps::{InstallAction, InstallStep};

const BUILTIN: &str = include_str!("builtin.yml");
const BUILTIN_ORIGIN: &str = "<builtin catalog>";

/// A step as declared in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDef {
    /// Binary whose presence means the step is satisfied.
    pub identifier: String,
    pub description: String,
    pub action: InstallAction,
}

impl StepDef {
    fn build(&self) -> InstallStep {
        InstallStep::new(
            self.identifier.clone(),
            self.description.clone(),
            Box::new(self.action.clone()),
        )
    }
}

/// A category as declared in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    categories: Vec<CategoryDef>,
}

/// Ordered category table.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<CategoryDef>,
}

impl Catalog {
    /// The embedded table.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN, Path::new(BUILTIN_ORIGIN))
    }

    /// Parse and validate a table. `origin` only labels errors.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self> {
        let file: CatalogFile =
            serde_yaml::from_str(content).map_err(|e| RigupError::ConfigParseError {
                path: PathBuf::from(origin),
                message: e.to_string(),
            })?;

        let catalog = Self {
            categories: file.categories,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check names are present and unique.
    ///
    /// Step identifiers must be unique across the whole table: the same tool
    /// listed twice would be installed by whichever step reached it first and
    /// reported as already present by the other.
    pub fn validate(&self) -> Result<()> {
        let mut categories = HashSet::new();
        let mut identifiers = HashSet::new();

        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(invalid("category with an empty name"));
            }
            if !categories.insert(category.name.as_str()) {
                return Err(invalid(format!(
                    "category '{}' is declared twice",
                    category.name
                )));
            }

            for step in &category.steps {
                if step.identifier.trim().is_empty() {
                    return Err(invalid(format!(
                        "category '{}' has a step with an empty identifier",
                        category.name
                    )));
                }
                if !identifiers.insert(step.identifier.as_str()) {
                    return Err(invalid(format!(
                        "step '{}' is declared more than once",
                        step.identifier
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    /// Category names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Drop steps by identifier. Naming a step the table does not have is
    /// an error, since it is almost always a typo.
    pub fn remove_steps(&mut self, identifiers: &[String]) -> Result<()> {
        for identifier in identifiers {
            let mut found = false;
            for category in &mut self.categories {
                let before = category.steps.len();
                category.steps.retain(|s| &s.identifier != identifier);
                found |= category.steps.len() != before;
            }
            if !found {
                return Err(invalid(format!(
                    "skip_steps names unknown step '{}'",
                    identifier
                )));
            }
        }
        Ok(())
    }

    /// Append a step to the end of `category`.
    pub fn add_step(&mut self, category: &str, step: StepDef) -> Result<()> {
        let target = self
            .categories
            .iter_mut()
            .find(|c| c.name == category)
            .ok_or_else(|| RigupError::UnknownCategory {
                name: category.to_string(),
            })?;
        target.steps.push(step);
        self.validate()
    }

    /// Runnable categories in table order, all enabled.
    pub fn build(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|def| {
                let steps = def.steps.iter().map(StepDef::build).collect();
                Category::new(def.name.clone(), def.title.clone(), steps)
            })
            .collect()
    }
}

fn invalid(message: impl Into<String>) -> RigupError {
    RigupError::ConfigValidationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
categories:
  - name: system
    title: System basics
    steps:
      - identifier: git
        description: Version control
        action:
          type: apt
          packages: [git]
  - name: languages
    title: Language toolchains
    steps:
      - identifier: rustup
        description: Rust
        action:
          type: script
          url: https://sh.rustup.rs
          args: ["-y"]
"#;

    fn small() -> Catalog {
        Catalog::from_yaml(SMALL, Path::new("test.yml")).unwrap()
    }

    #[test]
    fn builtin_catalog_parses_in_declared_order() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.names(),
            vec!["system", "ides", "containers", "cloud", "databases", "languages"]
        );
        assert!(catalog.categories().iter().all(|c| !c.steps.is_empty()));
    }

    #[test]
    fn builtin_languages_category_lists_toolchains() {
        let catalog = Catalog::builtin().unwrap();
        let languages = catalog.get("languages").unwrap();
        let ids: Vec<_> = languages
            .steps
            .iter()
            .map(|s| s.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["node", "pip3", "go", "rustup", "javac"]);
    }

    #[test]
    fn duplicate_category_is_rejected() {
        let yaml = r#"
categories:
  - name: system
    title: A
  - name: system
    title: B
"#;
        let err = Catalog::from_yaml(yaml, Path::new("dup.yml")).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let yaml = r#"
categories:
  - name: a
    title: A
    steps:
      - identifier: git
        description: one
        action: { type: apt, packages: [git] }
  - name: b
    title: B
    steps:
      - identifier: git
        description: two
        action: { type: apt, packages: [git] }
"#;
        let err = Catalog::from_yaml(yaml, Path::new("dup.yml")).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = Catalog::from_yaml("categories: [", Path::new("bad.yml")).unwrap_err();
        assert!(matches!(err, RigupError::ConfigParseError { .. }));
    }

    #[test]
    fn remove_steps_drops_by_identifier() {
        let mut catalog = small();
        catalog.remove_steps(&["git".to_string()]).unwrap();
        assert!(catalog.get("system").unwrap().steps.is_empty());
        assert_eq!(catalog.get("languages").unwrap().steps.len(), 1);
    }

    #[test]
    fn remove_unknown_step_is_an_error() {
        let mut catalog = small();
        let err = catalog.remove_steps(&["gti".to_string()]).unwrap_err();
        assert!(err.to_string().contains("gti"));
    }

    #[test]
    fn add_step_appends_to_category() {
        let mut catalog = small();
        catalog
            .add_step(
                "system",
                StepDef {
                    identifier: "tmux".into(),
                    description: "Terminal multiplexer".into(),
                    action: InstallAction::Apt {
                        packages: vec!["tmux".into()],
                    },
                },
            )
            .unwrap();

        let system = catalog.get("system").unwrap();
        assert_eq!(system.steps.last().unwrap().identifier, "tmux");
    }

    #[test]
    fn add_step_to_unknown_category_fails() {
        let mut catalog = small();
        let err = catalog
            .add_step(
                "games",
                StepDef {
                    identifier: "nethack".into(),
                    description: "Dungeon".into(),
                    action: InstallAction::Apt {
                        packages: vec!["nethack-console".into()],
                    },
                },
            )
            .unwrap_err();
        assert!(matches!(err, RigupError::UnknownCategory { name } if name == "games"));
    }

    #[test]
    fn build_keeps_order_and_steps() {
        let categories = small().build();

        assert_eq!(categories.len(), 2);
        assert!(categories.iter().all(|c| c.enabled));
        assert_eq!(categories[0].name, "system");
        assert_eq!(categories[1].steps[0].identifier(), "rustup");
        assert_eq!(
            categories[1].steps[0].action().describe(),
            "curl https://sh.rustup.rs | sh -s -- -y"
        );
    }
}
