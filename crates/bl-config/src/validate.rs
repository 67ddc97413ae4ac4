//! Configuration validation errors and semantic validation.

use std::collections::HashSet;

use bl_common::{Parameter, RateInputs};
use thiserror::Error;

use crate::scenario::{Scenario, ScenarioCatalog};
use crate::settings::LabConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Duplicate scenario name: {0}")]
    DuplicateName(String),

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 62,
            ValidationError::MissingField(_) => 63,
            ValidationError::InvalidValue { .. } => 64,
            ValidationError::DuplicateName(_) => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Check that all three rates are finite percentages in [0, 100].
///
/// `prefix` qualifies the field name in the error (e.g. `scenarios[0]`).
pub fn validate_rates(prefix: &str, inputs: &RateInputs) -> ValidationResult<()> {
    if let Some((parameter, value)) = inputs.first_out_of_range() {
        return Err(ValidationError::InvalidValue {
            field: qualify(prefix, parameter),
            message: format!("Must be in [0, 100], got {}", value),
        });
    }
    Ok(())
}

fn qualify(prefix: &str, parameter: Parameter) -> String {
    if prefix.is_empty() {
        parameter.as_str().to_string()
    } else {
        format!("{}.{}", prefix, parameter)
    }
}

/// Validate one scenario entry.
pub fn validate_scenario(prefix: &str, scenario: &Scenario) -> ValidationResult<()> {
    if scenario.name.trim().is_empty() {
        return Err(ValidationError::MissingField(format!("{}.name", prefix)));
    }
    validate_rates(prefix, &scenario.inputs())
}

/// Validate a scenario list: every entry valid, names unique (case-insensitive).
pub fn validate_catalog(catalog: &ScenarioCatalog) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for (idx, scenario) in catalog.list().iter().enumerate() {
        validate_scenario(&format!("scenarios[{}]", idx), scenario)?;
        if !seen.insert(scenario.name.to_ascii_lowercase()) {
            return Err(ValidationError::DuplicateName(scenario.name.clone()));
        }
    }
    Ok(())
}

/// Validate lab settings semantically.
pub fn validate_config(config: &LabConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    let population = config.reference_population;
    if !population.is_finite() || population <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "reference_population".to_string(),
            message: format!("Must be a positive number, got {}", population),
        });
    }

    let tolerance = config.change_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "change_tolerance".to_string(),
            message: format!("Must be a non-negative number, got {}", tolerance),
        });
    }

    for (idx, scenario) in config.scenarios.iter().enumerate() {
        validate_scenario(&format!("scenarios[{}]", idx), scenario)?;
    }

    let catalog = ScenarioCatalog::from_config(config);
    if catalog.is_empty() {
        return Err(ValidationError::SemanticError(
            "No scenarios available: include_builtin_scenarios is false and none are configured"
                .to_string(),
        ));
    }
    validate_catalog(&catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&LabConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rates_field_name() {
        let err = validate_rates("scenarios[2]", &RateInputs::new(5.0, 50.0, 120.0)).unwrap_err();
        match err {
            ValidationError::InvalidValue { field, .. } => {
                assert_eq!(field, "scenarios[2].specificity")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(validate_rates("", &RateInputs::new(0.0, 100.0, 50.0)).is_ok());
    }

    #[test]
    fn test_invalid_version() {
        let config = LabConfig {
            schema_version: "0.9.0".to_string(),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn test_non_positive_population() {
        let config = LabConfig {
            reference_population: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "reference_population"
        ));
    }

    #[test]
    fn test_negative_tolerance() {
        let config = LabConfig {
            change_tolerance: -0.5,
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_duplicate_of_builtin_rejected() {
        let mut config = LabConfig::default();
        config
            .scenarios
            .push(Scenario::new("fraud detection", 3.0, 90.0, 97.0, ""));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateName(ref n) if n == "fraud detection"));

        config.include_builtin_scenarios = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut config = LabConfig::default();
        config.scenarios.push(Scenario::new("  ", 3.0, 90.0, 97.0, ""));
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let config = LabConfig {
            include_builtin_scenarios: false,
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn test_builtin_catalog_valid() {
        assert!(validate_catalog(&ScenarioCatalog::builtin()).is_ok());
    }
}
