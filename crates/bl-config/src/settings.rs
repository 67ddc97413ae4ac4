//! Typed lab settings for `bayes-lab.json`.

use bl_common::REFERENCE_POPULATION;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;
use crate::validate::ValidationError;

/// Settings file contents. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Population size used for natural-frequency breakdowns.
    #[serde(default = "default_reference_population")]
    pub reference_population: f64,

    /// Smallest rate difference (percentage points) that counts as a change
    /// when explaining a recomputation. 0 means exact comparison.
    #[serde(default)]
    pub change_tolerance: f64,

    /// Whether the built-in presets are listed before configured ones.
    #[serde(default = "default_true")]
    pub include_builtin_scenarios: bool,

    /// Extra scenarios, appended after the built-ins.
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_reference_population() -> f64 {
    REFERENCE_POPULATION
}

fn default_true() -> bool {
    true
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            reference_population: REFERENCE_POPULATION,
            change_tolerance: 0.0,
            include_builtin_scenarios: true,
            scenarios: Vec::new(),
        }
    }
}

impl LabConfig {
    /// Parse settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = LabConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LabConfig::default());
        assert_eq!(config.reference_population, 1000.0);
        assert_eq!(config.change_tolerance, 0.0);
        assert!(config.include_builtin_scenarios);
    }

    #[test]
    fn parses_scenarios() {
        let json = r#"{
            "schema_version": "1.0.0",
            "reference_population": 10000,
            "scenarios": [
                {"name": "Spam filter", "prevalence": 40, "sensitivity": 97, "specificity": 99,
                 "insight": "Common events make positives reliable."}
            ]
        }"#;
        let config = LabConfig::from_json_str(json).unwrap();
        assert_eq!(config.reference_population, 10000.0);
        assert_eq!(config.scenarios.len(), 1);
        assert_eq!(config.scenarios[0].name, "Spam filter");
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = LabConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }
}
