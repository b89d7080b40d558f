//! Scenario registry and catalog loading
//!
//! A catalog is a YAML document listing categories in execution order, each
//! with its scenarios. The registry keeps the categories and a flat copy of
//! every scenario; the flat list is built from the categories, so slicing it
//! by category size always reproduces the partition.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::common::{Error, Result};

use super::step::Step;

const MANUAL_CATALOG: &str = include_str!("../../catalogs/manual.yaml");
const AUTOMATED_CATALOG: &str = include_str!("../../catalogs/automated.yaml");

/// One independently evaluable test case
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Stable identifier, unique within a registry (e.g. "T001")
    pub id: String,
    /// What the scenario verifies
    pub description: String,
    /// Owning category, filled in on registration
    #[serde(default, skip_deserializing)]
    pub category: String,
    /// Browser script; empty for checklist-only scenarios
    #[serde(default, skip_serializing)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            category: String::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }
}

/// A named, ordered group of scenarios
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    /// Shown to the operator before the category starts
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Category {
    pub fn new(name: impl Into<String>, scenarios: Vec<Scenario>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            scenarios,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Catalog file layout
#[derive(Deserialize, Debug)]
struct Catalog {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    categories: Vec<Category>,
}

/// Fixed, ordered collection of scenarios partitioned into categories
#[derive(Debug, Clone)]
pub struct ScenarioRegistry {
    title: Option<String>,
    categories: Vec<Category>,
    scenarios: Vec<Scenario>,
}

impl ScenarioRegistry {
    /// Build a registry from categories in execution order
    ///
    /// Fails if a scenario id is empty or used twice.
    pub fn new(mut categories: Vec<Category>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut scenarios = Vec::new();

        for category in &mut categories {
            for scenario in &mut category.scenarios {
                if scenario.id.trim().is_empty() {
                    return Err(Error::Catalog(format!(
                        "scenario with empty id in category '{}'",
                        category.name
                    )));
                }
                if !seen.insert(scenario.id.clone()) {
                    return Err(Error::Catalog(format!(
                        "duplicate scenario id '{}'",
                        scenario.id
                    )));
                }
                scenario.category = category.name.clone();
                scenarios.push(scenario.clone());
            }
        }

        Ok(Self {
            title: None,
            categories,
            scenarios,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse a YAML catalog
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_yaml::from_str(content).map_err(|e| Error::Catalog(e.to_string()))?;
        let registry = Self::new(catalog.categories)?;
        Ok(match catalog.title {
            Some(title) => registry.with_title(title),
            None => registry,
        })
    }

    /// Load a YAML catalog from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// The built-in manual checklist
    pub fn builtin_manual() -> Result<Self> {
        Self::from_yaml_str(MANUAL_CATALOG)
    }

    /// The built-in browser suite
    pub fn builtin_automated() -> Result<Self> {
        Self::from_yaml_str(AUTOMATED_CATALOG)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// All scenarios in execution order
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Categories in execution order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of scenarios in each category, in order
    pub fn category_sizes(&self) -> Vec<usize> {
        self.categories.iter().map(Category::len).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
