//! Odds, likelihood ratios, and evidence strength for a binary diagnostic test.
//!
//! For a test with sensitivity `s` and false-positive rate `f`, a positive
//! result multiplies the prior odds of the condition by the positive
//! likelihood ratio `LR+ = s / f`:
//!
//! ```text
//! posterior_odds = prior_odds × LR+
//! ```
//!
//! A negative result multiplies them by `LR- = (1 - s) / specificity`.
//! The likelihood ratio is the Bayes factor of the observation, so its
//! strength can be labelled on the Jeffreys scale.

use serde::Serialize;

/// Odds `p / (1 - p)`.
///
/// Returns +inf for `p == 1`. NaN propagates.
pub fn odds(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    p / (1.0 - p)
}

/// Ratio of two likelihoods with the diagnostic-test conventions.
///
/// `0 / 0` means the observation never occurs under either hypothesis and
/// carries no information, so it is 1. `x / 0` with `x > 0` is +inf.
fn likelihood_ratio(numerator: f64, denominator: f64) -> f64 {
    if numerator.is_nan() || denominator.is_nan() {
        return f64::NAN;
    }
    if denominator == 0.0 {
        if numerator == 0.0 {
            return 1.0;
        }
        return f64::INFINITY;
    }
    numerator / denominator
}

/// Positive likelihood ratio `sensitivity / false_positive_rate` (unit scale).
pub fn positive_likelihood_ratio(sensitivity: f64, false_positive_rate: f64) -> f64 {
    likelihood_ratio(sensitivity, false_positive_rate)
}

/// Negative likelihood ratio `(1 - sensitivity) / specificity` (unit scale).
pub fn negative_likelihood_ratio(sensitivity: f64, specificity: f64) -> f64 {
    likelihood_ratio(1.0 - sensitivity, specificity)
}

/// Evidence strength on the Jeffreys scale.
///
/// Labels are for presentation only; the raw ratio is always preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStrength {
    /// Ratio of exactly 1.
    None,
    /// |ln LR| < ln(3.2)
    Anecdotal,
    /// ln(3.2) <= |ln LR| < ln(10)
    Substantial,
    /// ln(10) <= |ln LR| < ln(32)
    Strong,
    /// ln(32) <= |ln LR| < ln(100)
    VeryStrong,
    /// |ln LR| >= ln(100)
    Decisive,
}

impl EvidenceStrength {
    /// Classify a likelihood ratio. Direction is reported separately.
    pub fn from_likelihood_ratio(lr: f64) -> Self {
        if lr.is_nan() || lr < 0.0 {
            return EvidenceStrength::None;
        }

        let abs_log = lr.ln().abs();

        const LN_3_2: f64 = 1.163_150_809_678_64; // ln(3.2)
        const LN_32: f64 = 3.465_735_902_799_727; // ln(32)
        const LN_100: f64 = 4.605_170_185_988_092; // ln(100)
        let ln_10 = std::f64::consts::LN_10;

        if abs_log < LN_3_2 {
            if abs_log < f64::EPSILON {
                EvidenceStrength::None
            } else {
                EvidenceStrength::Anecdotal
            }
        } else if abs_log < ln_10 {
            EvidenceStrength::Substantial
        } else if abs_log < LN_32 {
            EvidenceStrength::Strong
        } else if abs_log < LN_100 {
            EvidenceStrength::VeryStrong
        } else {
            EvidenceStrength::Decisive
        }
    }

    /// Return a short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceStrength::None => "none",
            EvidenceStrength::Anecdotal => "anecdotal",
            EvidenceStrength::Substantial => "substantial",
            EvidenceStrength::Strong => "strong",
            EvidenceStrength::VeryStrong => "very strong",
            EvidenceStrength::Decisive => "decisive",
        }
    }
}

impl std::fmt::Display for EvidenceStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which hypothesis an observation favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceDirection {
    /// LR > 1: the observation raises the odds of the condition.
    FavorsCondition,
    /// LR < 1: the observation lowers the odds of the condition.
    FavorsNoCondition,
    /// LR == 1 (or undefined).
    Neutral,
}

impl EvidenceDirection {
    /// Determine direction from a likelihood ratio.
    pub fn from_likelihood_ratio(lr: f64) -> Self {
        if lr.is_nan() || (lr - 1.0).abs() < f64::EPSILON {
            EvidenceDirection::Neutral
        } else if lr > 1.0 {
            EvidenceDirection::FavorsCondition
        } else {
            EvidenceDirection::FavorsNoCondition
        }
    }
}
