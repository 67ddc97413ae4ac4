//! Scenario presets for the Bayes calculator.
//!
//! A scenario is a named parameter triple with a one-line insight. The
//! built-in catalog is fixed for the lifetime of the process; a config file
//! may add entries (see [`crate::settings::LabConfig`]).
//!
//! Built-in presets:
//! - Rare disease screening: low base rate, decent test
//! - Specialist clinic: high base rate
//! - Fraud detection: rare event, very specific detector

use bl_common::RateInputs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::settings::LabConfig;

/// A named preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scenario {
    /// Unique display name.
    pub name: String,
    /// Percentage in [0, 100].
    pub prevalence: f64,
    /// Percentage in [0, 100].
    pub sensitivity: f64,
    /// Percentage in [0, 100].
    pub specificity: f64,
    /// Canned takeaway shown alongside the preset.
    #[serde(default)]
    pub insight: String,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        prevalence: f64,
        sensitivity: f64,
        specificity: f64,
        insight: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prevalence,
            sensitivity,
            specificity,
            insight: insight.into(),
        }
    }

    /// The rate triple this scenario pre-fills.
    pub fn inputs(&self) -> RateInputs {
        RateInputs::new(self.prevalence, self.sensitivity, self.specificity)
    }
}

static BUILTIN: OnceLock<Vec<Scenario>> = OnceLock::new();

fn builtin_catalog() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "Rare disease screening",
            1.0,
            95.0,
            95.0,
            "Rare condition + imperfect specificity can produce many false positives.",
        ),
        Scenario::new(
            "Specialist clinic",
            30.0,
            92.0,
            94.0,
            "Higher base rate makes a positive result more trustworthy.",
        ),
        Scenario::new(
            "Fraud detection",
            2.0,
            90.0,
            98.0,
            "Fraud is rare; tiny specificity drops create false-alert floods.",
        ),
    ]
}

/// The built-in scenarios, in display order.
pub fn list_scenarios() -> &'static [Scenario] {
    BUILTIN.get_or_init(builtin_catalog)
}

/// Look up a built-in scenario by exact name.
pub fn find_scenario(name: &str) -> Option<&'static Scenario> {
    list_scenarios().iter().find(|s| s.name == name)
}

/// An ordered scenario list: built-ins (optionally) followed by configured entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Catalog containing only the built-in scenarios.
    pub fn builtin() -> Self {
        Self {
            scenarios: list_scenarios().to_vec(),
        }
    }

    /// Catalog from an explicit list, order preserved.
    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Catalog described by a lab configuration.
    pub fn from_config(config: &LabConfig) -> Self {
        let mut scenarios = if config.include_builtin_scenarios {
            list_scenarios().to_vec()
        } else {
            Vec::new()
        };
        scenarios.extend(config.scenarios.iter().cloned());
        Self { scenarios }
    }

    /// All scenarios in display order.
    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Find a scenario by name.
    ///
    /// Exact match wins; otherwise the first case-insensitive match.
    pub fn find(&self, name: &str) -> Option<&Scenario> {
        let name = name.trim();
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .or_else(|| {
                self.scenarios
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(name))
            })
    }

    /// Scenario names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
