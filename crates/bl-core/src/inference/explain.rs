//! Natural-language summary of how a recomputation moved the posterior.
//!
//! The explainer is stateless: the previous result is an explicit argument
//! owned by the caller. Only the three normalized rates and the posterior
//! of each result are inspected.

use bl_common::Parameter;
use bl_math::{approx_eq, format_points, unit_to_percent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::posterior::PosteriorResult;

/// Shown when there is no previous result to compare against.
pub const ONBOARDING_MESSAGE: &str =
    "Move one slider at a time. Watch whether true positives rise faster than false positives.";

/// Effect clause when the posterior did not move.
pub const UNCHANGED_MESSAGE: &str = "Posterior stayed nearly unchanged.";

/// Comparison settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExplainOptions {
    /// Differences of at most this many percentage points count as unchanged.
    /// Applies to the three rates and to the posterior. 0 is exact equality.
    pub tolerance: f64,
}

impl ExplainOptions {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

/// Which raw inputs differ between two results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChangeSet {
    pub prevalence: bool,
    pub sensitivity: bool,
    pub specificity: bool,
}

impl ChangeSet {
    /// Compare the normalized rates of two results.
    pub fn between(previous: &PosteriorResult, current: &PosteriorResult, tolerance: f64) -> Self {
        Self {
            prevalence: differs(previous.p_disease, current.p_disease, tolerance),
            sensitivity: differs(
                previous.p_positive_given_disease,
                current.p_positive_given_disease,
                tolerance,
            ),
            specificity: differs(
                previous.p_negative_given_no_disease,
                current.p_negative_given_no_disease,
                tolerance,
            ),
        }
    }

    pub fn contains(&self, parameter: Parameter) -> bool {
        match parameter {
            Parameter::Prevalence => self.prevalence,
            Parameter::Sensitivity => self.sensitivity,
            Parameter::Specificity => self.specificity,
        }
    }

    /// Changed parameters in display order.
    pub fn changed(&self) -> Vec<Parameter> {
        Parameter::ALL
            .into_iter()
            .filter(|p| self.contains(*p))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !(self.prevalence || self.sensitivity || self.specificity)
    }

    pub fn len(&self) -> usize {
        self.changed().len()
    }
}

/// Unit-scale rates compared in percentage points.
/// NaN on either side counts as a change.
fn differs(a: f64, b: f64, tolerance: f64) -> bool {
    !approx_eq(unit_to_percent(a), unit_to_percent(b), tolerance)
}

/// Direction and size of the posterior move, in percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum PosteriorShift {
    Increased { points: f64 },
    Decreased { points: f64 },
    Unchanged,
}

impl PosteriorShift {
    /// Classify a signed delta. A NaN delta is unchanged.
    pub fn from_delta(delta_points: f64, tolerance: f64) -> Self {
        if delta_points > tolerance {
            PosteriorShift::Increased {
                points: delta_points,
            }
        } else if delta_points < -tolerance {
            PosteriorShift::Decreased {
                points: delta_points.abs(),
            }
        } else {
            PosteriorShift::Unchanged
        }
    }

    /// Shift between two results.
    pub fn between(previous: &PosteriorResult, current: &PosteriorResult, tolerance: f64) -> Self {
        Self::from_delta(
            unit_to_percent(current.posterior - previous.posterior),
            tolerance,
        )
    }

    pub fn sentence(&self) -> String {
        match self {
            PosteriorShift::Increased { points } => {
                format!("Posterior increased by {} points.", format_points(*points))
            }
            PosteriorShift::Decreased { points } => {
                format!("Posterior decreased by {} points.", format_points(*points))
            }
            PosteriorShift::Unchanged => UNCHANGED_MESSAGE.to_string(),
        }
    }
}

/// Structured explanation plus its rendered text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChangeExplanation {
    pub changes: ChangeSet,
    /// None on the first computation (no previous result).
    pub shift: Option<PosteriorShift>,
    pub text: String,
}

impl ChangeExplanation {
    pub fn is_initial(&self) -> bool {
        self.shift.is_none()
    }
}

fn change_note(parameter: Parameter) -> String {
    format!("You changed {} ({}).", parameter, parameter.concept())
}

/// Explain the move from `previous` to `current` with exact comparison.
pub fn explain_change(previous: Option<&PosteriorResult>, current: &PosteriorResult) -> String {
    explain_change_detailed(previous, current, &ExplainOptions::default()).text
}

/// Explain the move from `previous` to `current`.
pub fn explain_change_detailed(
    previous: Option<&PosteriorResult>,
    current: &PosteriorResult,
    options: &ExplainOptions,
) -> ChangeExplanation {
    let Some(previous) = previous else {
        return ChangeExplanation {
            changes: ChangeSet::default(),
            shift: None,
            text: ONBOARDING_MESSAGE.to_string(),
        };
    };

    let changes = ChangeSet::between(previous, current, options.tolerance);
    let shift = PosteriorShift::between(previous, current, options.tolerance);

    let mut clauses: Vec<String> = changes.changed().into_iter().map(change_note).collect();
    clauses.push(shift.sentence());

    ChangeExplanation {
        changes,
        shift: Some(shift),
        text: clauses.join(" "),
    }
}
