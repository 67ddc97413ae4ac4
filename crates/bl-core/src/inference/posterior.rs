//! Closed-form posterior P(condition | positive) for a two-class test.
//!
//! Rates arrive as percentages and are normalized to unit probabilities.
//! Frequencies are expressed over a reference population and returned
//! unrounded; rounding is a display concern (see [`RoundedFrequencies`]).

use bl_common::{RateInputs, REFERENCE_POPULATION};
use bl_math::{complement, percent_to_unit, round_count, safe_ratio};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Full result of one posterior computation.
///
/// Invariants for inputs in [0, 100]:
/// - `true_positive + false_negative == diseased`
/// - `false_positive + true_negative == healthy`
/// - `diseased + healthy == population`
/// - `posterior` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PosteriorResult {
    /// Reference population size N.
    pub population: f64,

    /// P(D)
    pub p_disease: f64,
    /// P(+|D)
    pub p_positive_given_disease: f64,
    /// P(-|No D)
    pub p_negative_given_no_disease: f64,
    /// P(+|No D) = 1 - specificity
    pub p_positive_given_no_disease: f64,
    /// P(+ and D), the Bayes numerator.
    pub p_joint_positive: f64,
    /// P(+), the Bayes denominator.
    pub p_positive: f64,
    /// P(D|+), defined as 0 when `p_positive` is exactly 0.
    pub posterior: f64,

    pub diseased: f64,
    pub healthy: f64,
    pub true_positive: f64,
    pub false_negative: f64,
    pub false_positive: f64,
    pub true_negative: f64,
}

/// Compute the posterior over the canonical reference population.
pub fn compute(inputs: RateInputs) -> PosteriorResult {
    compute_with_population(inputs, REFERENCE_POPULATION)
}

/// Compute the posterior with frequencies over `population` people.
///
/// Total for any finite or non-finite input; never panics.
pub fn compute_with_population(inputs: RateInputs, population: f64) -> PosteriorResult {
    let p_d = percent_to_unit(inputs.prevalence);
    let p_pos_d = percent_to_unit(inputs.sensitivity);
    let p_neg_no_d = percent_to_unit(inputs.specificity);
    let p_pos_no_d = complement(p_neg_no_d);

    let numerator = p_pos_d * p_d;
    let denominator = numerator + p_pos_no_d * complement(p_d);
    let posterior = safe_ratio(numerator, denominator);

    let diseased = population * p_d;
    let healthy = population - diseased;
    let true_positive = diseased * p_pos_d;
    let false_negative = diseased - true_positive;
    let false_positive = healthy * p_pos_no_d;
    let true_negative = healthy - false_positive;

    PosteriorResult {
        population,
        p_disease: p_d,
        p_positive_given_disease: p_pos_d,
        p_negative_given_no_disease: p_neg_no_d,
        p_positive_given_no_disease: p_pos_no_d,
        p_joint_positive: numerator,
        p_positive: denominator,
        posterior,
        diseased,
        healthy,
        true_positive,
        false_negative,
        false_positive,
        true_negative,
    }
}

impl PosteriorResult {
    /// Expected number of positive results in the population.
    pub fn positives(&self) -> f64 {
        self.true_positive + self.false_positive
    }

    /// Counts rounded half-up for display.
    pub fn rounded(&self) -> RoundedFrequencies {
        RoundedFrequencies {
            diseased: round_count(self.diseased),
            healthy: round_count(self.healthy),
            true_positive: round_count(self.true_positive),
            false_negative: round_count(self.false_negative),
            false_positive: round_count(self.false_positive),
            true_negative: round_count(self.true_negative),
        }
    }

    /// "10 have the condition. 10 are true positives. 50 are false positives."
    pub fn natural_frequency_sentence(&self) -> String {
        let r = self.rounded();
        format!(
            "{} have the condition. {} are true positives. {} are false positives.",
            r.diseased, r.true_positive, r.false_positive
        )
    }
}

/// Whole-number view of the frequency counts.
///
/// Rounded independently, so the rounded parts need not sum to the rounded
/// whole (9.5 + 0.5 rounds to 10 + 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoundedFrequencies {
    pub diseased: i64,
    pub healthy: i64,
    pub true_positive: i64,
    pub false_negative: i64,
    pub false_positive: i64,
    pub true_negative: i64,
}
