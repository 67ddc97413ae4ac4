//! Rate conversions and zero-safe arithmetic for closed-form Bayesian math.

/// Scale between percentage inputs and unit probabilities.
pub const PERCENT_SCALE: f64 = 100.0;

/// Lower bound of a percentage rate.
pub const PERCENT_MIN: f64 = 0.0;

/// Upper bound of a percentage rate.
pub const PERCENT_MAX: f64 = 100.0;

/// Convert a percentage to a unit probability.
///
/// Values outside [0, 100] pass through arithmetically; callers validate.
pub fn percent_to_unit(percent: f64) -> f64 {
    percent / PERCENT_SCALE
}

/// Convert a unit probability to a percentage.
pub fn unit_to_percent(p: f64) -> f64 {
    p * PERCENT_SCALE
}

/// Complement probability `1 - p`.
pub fn complement(p: f64) -> f64 {
    1.0 - p
}

/// `numerator / denominator`, defined as 0 when the denominator is exactly zero.
///
/// Only an exact zero triggers the convention; tiny denominators divide normally.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Whether `value` is finite and inside the closed interval [lo, hi].
pub fn in_closed_range(value: f64, lo: f64, hi: f64) -> bool {
    value.is_finite() && value >= lo && value <= hi
}

/// Whether `value` is a valid percentage rate.
pub fn is_percent(value: f64) -> bool {
    in_closed_range(value, PERCENT_MIN, PERCENT_MAX)
}

/// Clamp a percentage into [0, 100]. NaN maps to 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return PERCENT_MIN;
    }
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Absolute-tolerance comparison.
///
/// NaN never compares equal. Infinities compare equal only to the same
/// infinity. A tolerance of 0 is exact equality.
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= tol
}
