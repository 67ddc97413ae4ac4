//! Errors raised around the Bayes Lab engine.
//!
//! Each variant has a stable numeric code, a category, a recoverability flag
//! and a short fix-it hint, so the CLI can print either a human message or
//! a JSON object without extra plumbing.
//!
//! The posterior engine and change explainer are total and never produce
//! these errors; they come from the layers around them (configuration,
//! argument validation, scenario lookup, I/O).
//!
//! # Machine output
//!
//! `StructuredError` is what `--format json` writes to stderr:
//! ```json
//! {
//!   "code": 20,
//!   "category": "input",
//!   "message": "sensitivity must be within [0, 100], got 140",
//!   "recoverable": true,
//!   "suggested_action": "fix_input",
//!   "context": { "parameter": "sensitivity", "value": 140.0 }
//! }
//! ```

use crate::rates::Parameter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Shorthand used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse grouping of error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Caller-supplied rate or argument errors.
    Input,
    /// Scenario catalog lookups.
    Catalog,
    /// Reading files or (de)serializing JSON.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Catalog => write!(f, "catalog"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// What a script driving the CLI should try next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Run the configuration check command.
    RunCheck,
    /// Fall back to the built-in configuration.
    ResetConfig,
    /// Correct the offending input value.
    FixInput,
    /// List available scenarios.
    ListScenarios,
    /// Retry the operation.
    Retry,
    /// Needs a person to look at it.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::ResetConfig => write!(f, "reset_config"),
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::ListScenarios => write!(f, "list_scenarios"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Every failure the lab can report.
#[derive(Error, Debug)]
pub enum Error {
    // config (10-19)
    #[error("config: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("config schema mismatch: {0}")]
    SchemaValidation(String),

    // input (20-29)
    #[error("{parameter} must be within [0, 100], got {value}")]
    InvalidRate { parameter: Parameter, value: f64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // catalog (30-39)
    #[error("scenario not found: {name}")]
    ScenarioNotFound { name: String },

    #[error("duplicate scenario name: {name}")]
    DuplicateScenario { name: String },

    // io (60-69)
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable code. The tens digit is the category: 1x config, 2x input,
    /// 3x catalog, 6x io.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig(_) => 11,
            Error::SchemaValidation(_) => 12,
            Error::InvalidRate { .. } => 20,
            Error::InvalidArgument(_) => 21,
            Error::ScenarioNotFound { .. } => 30,
            Error::DuplicateScenario { .. } => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) | Error::SchemaValidation(_) => {
                ErrorCategory::Config
            }
            Error::InvalidRate { .. } | Error::InvalidArgument(_) => ErrorCategory::Input,
            Error::ScenarioNotFound { .. } | Error::DuplicateScenario { .. } => {
                ErrorCategory::Catalog
            }
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Whether rerunning with different input or config can succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidConfig(_) => true,
            Error::SchemaValidation(_) => true,

            Error::InvalidRate { .. } => true,
            Error::InvalidArgument(_) => true,

            Error::ScenarioNotFound { .. } => true,
            // Catalog files are fixed at load time
            Error::DuplicateScenario { .. } => false,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidConfig(_) => SuggestedAction::ResetConfig,
            Error::SchemaValidation(_) => SuggestedAction::RunCheck,

            Error::InvalidRate { .. } => SuggestedAction::FixInput,
            Error::InvalidArgument(_) => SuggestedAction::FixInput,

            Error::ScenarioNotFound { .. } => SuggestedAction::ListScenarios,
            Error::DuplicateScenario { .. } => SuggestedAction::ResetConfig,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// One-line fix-it hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'bayes-lab check' to validate configuration, or check syntax in bayes-lab.json."
            }
            Error::InvalidConfig(_) => {
                "Fix the reported field in bayes-lab.json, or remove the file to use built-in defaults."
            }
            Error::SchemaValidation(_) => {
                "Ensure bayes-lab.json declares schema_version \"1.0.0\"."
            }
            Error::InvalidRate { .. } => {
                "Rates are percentages: pass values between 0 and 100."
            }
            Error::InvalidArgument(_) => "Run with '--help' to see the expected arguments.",
            Error::ScenarioNotFound { .. } => {
                "List available scenarios with 'bayes-lab scenarios list'."
            }
            Error::DuplicateScenario { .. } => {
                "Scenario names must be unique across built-in and configured scenarios. Rename one."
            }
            Error::Io(_) => "Check that the file exists and is readable, then retry.",
            Error::Json(_) => {
                "Invalid JSON. Check syntax with 'jq . <file>' or restore from backup."
            }
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Config Problem",
            Error::InvalidConfig(_) => "Invalid Configuration",
            Error::SchemaValidation(_) => "Unsupported Config Version",
            Error::InvalidRate { .. } => "Rate Out of Range",
            Error::InvalidArgument(_) => "Invalid Argument",
            Error::ScenarioNotFound { .. } => "Scenario Not Found",
            Error::DuplicateScenario { .. } => "Duplicate Scenario",
            Error::Io(_) => "File Access Failed",
            Error::Json(_) => "Malformed JSON",
        }
    }

    /// Render the error for human consumption.
    ///
    /// ```text
    /// ✗ Rate Out of Range
    ///   Reason: sensitivity must be within [0, 100], got 140
    ///   Fix: Rates are percentages: pass values between 0 and 100.
    /// ```
    pub fn to_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// JSON form of an [`Error`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    pub suggested_action: SuggestedAction,
    /// Offending parameter, scenario name, exit code name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidRate { parameter, value } => {
                context.insert("parameter".to_string(), serde_json::json!(parameter));
                // Non-finite values have no JSON number form
                context.insert(
                    "value".to_string(),
                    serde_json::Number::from_f64(*value)
                        .map(serde_json::Value::Number)
                        .unwrap_or_else(|| serde_json::json!(value.to_string())),
                );
            }
            Error::ScenarioNotFound { name } | Error::DuplicateScenario { name } => {
                context.insert("scenario".to_string(), serde_json::json!(name));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Attach one more context entry. Unserializable values are dropped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Single-line JSON, falling back to a bare code object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| serde_json::json!({ "code": self.code }).to_string())
    }
}
