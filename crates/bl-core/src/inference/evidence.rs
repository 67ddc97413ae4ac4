//! Odds-form view of a posterior: prior odds × LR+ = posterior odds.

use bl_math::odds::{
    negative_likelihood_ratio, odds, positive_likelihood_ratio, EvidenceDirection,
    EvidenceStrength,
};
use schemars::JsonSchema;
use serde::Serialize;

use super::posterior::PosteriorResult;

/// Evidence carried by a positive result.
///
/// Ratios and odds that are infinite (zero false-positive rate, certain
/// prior) are reported as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct EvidenceSummary {
    pub prior_odds: Option<f64>,
    pub positive_likelihood_ratio: Option<f64>,
    pub negative_likelihood_ratio: Option<f64>,
    pub posterior_odds: Option<f64>,
    #[schemars(with = "String")]
    pub strength: EvidenceStrength,
    #[schemars(with = "String")]
    pub direction: EvidenceDirection,
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

impl EvidenceSummary {
    pub fn from_result(result: &PosteriorResult) -> Self {
        let lr_pos = positive_likelihood_ratio(
            result.p_positive_given_disease,
            result.p_positive_given_no_disease,
        );
        let lr_neg = negative_likelihood_ratio(
            result.p_positive_given_disease,
            result.p_negative_given_no_disease,
        );

        Self {
            prior_odds: finite(odds(result.p_disease)),
            positive_likelihood_ratio: finite(lr_pos),
            negative_likelihood_ratio: finite(lr_neg),
            posterior_odds: finite(odds(result.posterior)),
            strength: EvidenceStrength::from_likelihood_ratio(lr_pos),
            direction: EvidenceDirection::from_likelihood_ratio(lr_pos),
        }
    }

    /// One-line description, e.g. "A positive result is strong evidence (LR+ 19.00)."
    pub fn describe(&self) -> String {
        let lr = match self.positive_likelihood_ratio {
            Some(lr) => format!("{:.2}", lr),
            None => "∞".to_string(),
        };
        let lean = match self.direction {
            EvidenceDirection::FavorsCondition => "for",
            EvidenceDirection::FavorsNoCondition => "against",
            EvidenceDirection::Neutral => {
                return format!("A positive result is uninformative (LR+ {}).", lr)
            }
        };
        format!(
            "A positive result is {} evidence {} the condition (LR+ {}).",
            self.strength, lean, lr
        )
    }
}
