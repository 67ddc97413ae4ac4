//! Rate inputs for the two-class diagnostic-test model.
//!
//! All three rates are percentages nominally in [0, 100]. Range checking is a
//! caller concern: the engine accepts any value arithmetically.

use bl_math::{clamp_percent, is_percent};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the reference population for natural-frequency breakdowns.
pub const REFERENCE_POPULATION: f64 = 1000.0;

/// One of the three raw inputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    /// P(condition present) in the reference population.
    Prevalence,
    /// P(positive | condition present).
    Sensitivity,
    /// P(negative | condition absent).
    Specificity,
}

impl Parameter {
    /// All parameters in display order.
    pub const ALL: [Parameter; 3] = [
        Parameter::Prevalence,
        Parameter::Sensitivity,
        Parameter::Specificity,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Prevalence => "prevalence",
            Parameter::Sensitivity => "sensitivity",
            Parameter::Specificity => "specificity",
        }
    }

    /// The concept the parameter controls, for explanations.
    pub fn concept(&self) -> &'static str {
        match self {
            Parameter::Prevalence => "base rate",
            Parameter::Sensitivity => "catching real cases",
            Parameter::Specificity => "avoiding false alarms",
        }
    }

    /// Parse a parameter name or common alias.
    pub fn parse(s: &str) -> Option<Parameter> {
        match s.trim().to_lowercase().as_str() {
            "prevalence" | "prev" | "base-rate" | "base_rate" | "prior" => {
                Some(Parameter::Prevalence)
            }
            "sensitivity" | "sens" | "tpr" | "recall" => Some(Parameter::Sensitivity),
            "specificity" | "spec" | "tnr" => Some(Parameter::Specificity),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::parse(s).ok_or_else(|| format!("unknown parameter: {}", s))
    }
}

/// The three population rates, as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RateInputs {
    pub prevalence: f64,
    pub sensitivity: f64,
    pub specificity: f64,
}

impl RateInputs {
    pub const fn new(prevalence: f64, sensitivity: f64, specificity: f64) -> Self {
        Self {
            prevalence,
            sensitivity,
            specificity,
        }
    }

    /// Read one rate.
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Prevalence => self.prevalence,
            Parameter::Sensitivity => self.sensitivity,
            Parameter::Specificity => self.specificity,
        }
    }

    /// Copy with one rate replaced.
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        match parameter {
            Parameter::Prevalence => self.prevalence = value,
            Parameter::Sensitivity => self.sensitivity = value,
            Parameter::Specificity => self.specificity = value,
        }
        self
    }

    /// Copy with every rate clamped into [0, 100] (NaN becomes 0).
    pub fn clamped(self) -> Self {
        Self {
            prevalence: clamp_percent(self.prevalence),
            sensitivity: clamp_percent(self.sensitivity),
            specificity: clamp_percent(self.specificity),
        }
    }

    /// First rate that is non-finite or outside [0, 100], in display order.
    pub fn first_out_of_range(&self) -> Option<(Parameter, f64)> {
        Parameter::ALL
            .iter()
            .map(|p| (*p, self.get(*p)))
            .find(|(_, v)| !is_percent(*v))
    }

    /// Whether all three rates are valid percentages.
    pub fn is_in_range(&self) -> bool {
        self.first_out_of_range().is_none()
    }

    /// Parse a `prevalence,sensitivity,specificity` triple.
    pub fn parse_triple(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!(
                "expected prevalence,sensitivity,specificity; got '{}'",
                s
            ));
        }
        let mut values = [0.0_f64; 3];
        for (slot, (part, parameter)) in values.iter_mut().zip(parts.iter().zip(Parameter::ALL)) {
            *slot = part
                .parse::<f64>()
                .map_err(|_| format!("invalid {} '{}'", parameter, part))?;
        }
        Ok(Self::new(values[0], values[1], values[2]))
    }
}

impl fmt::Display for RateInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prevalence={}% sensitivity={}% specificity={}%",
            self.prevalence, self.sensitivity, self.specificity
        )
    }
}

impl std::str::FromStr for RateInputs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RateInputs::parse_triple(s)
    }
}
