//! One-parameter sweeps: the posterior curve as a single rate moves.

use bl_common::{Parameter, RateInputs};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::posterior::compute;

/// Upper bound on points per sweep.
pub const MAX_SWEEP_POINTS: usize = 10_001;

/// One sample of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SweepPoint {
    /// Value of the swept parameter (percent).
    pub value: f64,
    pub posterior: f64,
    pub true_positive: f64,
    pub false_positive: f64,
}

/// Vary `parameter` from `start` to `end` (inclusive) in `step` increments,
/// holding the other two rates of `base` fixed.
///
/// Returns an empty curve for a non-positive or non-finite step, non-finite
/// bounds, or `start > end`. Values are computed as `start + i * step` to
/// avoid accumulated drift; `end` is included when it lands on the grid
/// (within 1e-9 of a step).
pub fn sweep(
    base: RateInputs,
    parameter: Parameter,
    start: f64,
    end: f64,
    step: f64,
) -> Vec<SweepPoint> {
    if !(step.is_finite() && step > 0.0 && start.is_finite() && end.is_finite()) || start > end {
        return Vec::new();
    }

    let span = (end - start) / step;
    let count = ((span + 1e-9).floor() as usize)
        .saturating_add(1)
        .min(MAX_SWEEP_POINTS);

    (0..count)
        .map(|i| {
            let value = (start + i as f64 * step).min(end);
            let result = compute(base.with(parameter, value));
            SweepPoint {
                value,
                posterior: result.posterior,
                true_positive: result.true_positive,
                false_positive: result.false_positive,
            }
        })
        .collect()
}
