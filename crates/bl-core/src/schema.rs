//! JSON Schema generation for command output types.
//!
//! ```bash
//! bayes-lab schema --list
//! bayes-lab schema PosteriorResult
//! bayes-lab schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::inference::{
    ChangeExplanation, ChangeSet, EvidenceSummary, ExplainOptions, PosteriorResult,
    PosteriorShift, RoundedFrequencies, SweepPoint,
};
pub use crate::lab::LabStep;
pub use bl_common::{Parameter, RateInputs};
pub use bl_config::{LabConfig, Scenario};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Inputs
        ("Parameter", "Rate name: prevalence, sensitivity, or specificity"),
        ("RateInputs", "Prevalence, sensitivity and specificity in percent"),
        ("Scenario", "Named preset with rates and an insight"),
        ("LabConfig", "bayes-lab.json settings file"),
        // Engine
        (
            "PosteriorResult",
            "Posterior probability with conditional probabilities and frequencies",
        ),
        ("RoundedFrequencies", "Natural frequencies rounded for display"),
        ("EvidenceSummary", "Odds and likelihood ratios for a test"),
        ("SweepPoint", "One point of a parameter sweep"),
        // Explainer
        ("ExplainOptions", "Change comparison tolerance"),
        ("ChangeSet", "Which rates differ between two results"),
        ("PosteriorShift", "Direction and size of the posterior change"),
        ("ChangeExplanation", "Structured and textual change explanation"),
        ("LabStep", "One recomputation in a lab session"),
    ]
}

/// Generate JSON Schema for a type by name, or None if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "Parameter" => schema_for!(Parameter),
        "RateInputs" => schema_for!(RateInputs),
        "Scenario" => schema_for!(Scenario),
        "LabConfig" => schema_for!(LabConfig),
        "PosteriorResult" => schema_for!(PosteriorResult),
        "RoundedFrequencies" => schema_for!(RoundedFrequencies),
        "EvidenceSummary" => schema_for!(EvidenceSummary),
        "SweepPoint" => schema_for!(SweepPoint),
        "ExplainOptions" => schema_for!(ExplainOptions),
        "ChangeSet" => schema_for!(ChangeSet),
        "PosteriorShift" => schema_for!(PosteriorShift),
        "ChangeExplanation" => schema_for!(ChangeExplanation),
        "LabStep" => schema_for!(LabStep),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    let mut schemas = BTreeMap::new();
    for (name, _desc) in available_schemas() {
        if let Some(schema) = generate_schema(name) {
            schemas.insert(name.to_string(), schema);
        }
    }
    schemas
}

/// Schema output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

pub fn format_schema(schema: &Value, format: SchemaFormat) -> String {
    let formatted = match format {
        SchemaFormat::Json => serde_json::to_string_pretty(schema),
        SchemaFormat::JsonCompact => serde_json::to_string(schema),
    };
    formatted.unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_schemas_generate() {
        for (name, _desc) in available_schemas() {
            assert!(generate_schema(name).is_some(), "schema for '{}'", name);
        }
    }

    #[test]
    fn test_unknown_schema_returns_none() {
        assert!(generate_schema("Plan").is_none());
        assert!(generate_schema("").is_none());
    }

    #[test]
    fn test_posterior_result_lists_fields() {
        let schema = generate_schema("PosteriorResult").unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["posterior", "p_positive_given_no_disease", "true_negative"] {
            assert!(properties.contains_key(field), "missing {}", field);
        }
    }

    #[test]
    fn test_generate_all_schemas() {
        let all = generate_all_schemas();
        assert_eq!(all.len(), available_schemas().len());
        assert!(all.contains_key("ChangeExplanation"));
        assert!(all.contains_key("LabConfig"));
    }

    #[test]
    fn test_format_schema() {
        let schema = generate_schema("SweepPoint").unwrap();
        assert!(format_schema(&schema, SchemaFormat::Json).contains('\n'));
        assert!(!format_schema(&schema, SchemaFormat::JsonCompact).contains('\n'));
    }
}
