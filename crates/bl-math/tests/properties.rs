//! Property-based tests for bl-math numerical functions.
//!
//! Uses proptest to verify mathematical properties hold across many random inputs.

use bl_math::odds::{odds, positive_likelihood_ratio, EvidenceStrength};
use bl_math::{approx_eq, clamp_percent, is_percent, percent_to_unit, round_count, safe_ratio};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

// ============================================================================
// rate properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Every percentage in range maps into the unit interval.
    #[test]
    fn percent_to_unit_stays_in_unit_interval(p in 0.0..=100.0f64) {
        let u = percent_to_unit(p);
        prop_assert!((0.0..=1.0).contains(&u), "percent_to_unit({}) = {}", p, u);
    }

    /// Clamping always produces a valid percentage.
    #[test]
    fn clamp_percent_is_valid(v in -1e6..1e6f64) {
        let c = clamp_percent(v);
        prop_assert!(is_percent(c), "clamp_percent({}) = {}", v, c);
        if is_percent(v) {
            prop_assert_eq!(c, v);
        }
    }

    /// safe_ratio of a part over its whole lies in [0, 1].
    #[test]
    fn safe_ratio_part_of_whole(part in 0.0..1.0f64, rest in 0.0..1.0f64) {
        let r = safe_ratio(part, part + rest);
        prop_assert!((0.0..=1.0).contains(&r), "safe_ratio({}, {}) = {}", part, part + rest, r);
    }

    /// approx_eq is symmetric.
    #[test]
    fn approx_eq_symmetric(a in -1e3..1e3f64, b in -1e3..1e3f64, tol in 0.0..10.0f64) {
        prop_assert_eq!(approx_eq(a, b, tol), approx_eq(b, a, tol));
    }
}

// ============================================================================
// odds properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Odds are monotone in probability.
    #[test]
    fn odds_monotone(a in 0.0..0.999f64, b in 0.0..0.999f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(odds(lo) <= odds(hi));
    }

    /// Bayes in odds form matches the direct posterior formula.
    #[test]
    fn odds_form_matches_direct(
        prior in 0.001..0.999f64,
        sens in 0.001..1.0f64,
        fpr in 0.001..1.0f64,
    ) {
        let direct = sens * prior / (sens * prior + fpr * (1.0 - prior));
        let via_odds = odds(prior) * positive_likelihood_ratio(sens, fpr);
        prop_assert!(
            approx_eq(odds(direct), via_odds, 1e-9 * via_odds.max(1.0)),
            "direct odds={} via_odds={}", odds(direct), via_odds
        );
    }

    /// Strength depends only on |ln LR|.
    #[test]
    fn strength_reciprocal_symmetric(lr in 1.001..1e4f64) {
        let a = EvidenceStrength::from_likelihood_ratio(lr);
        let b = EvidenceStrength::from_likelihood_ratio(1.0 / lr);
        // Reciprocal may land on the other side of a threshold by one ulp.
        prop_assert!((a as i32 - b as i32).abs() <= 1, "lr={} {:?} vs {:?}", lr, a, b);
    }

    /// Half-up rounding is within half a unit.
    #[test]
    fn round_count_within_half(c in 0.0..1e6f64) {
        let r = round_count(c) as f64;
        prop_assert!((r - c).abs() <= 0.5 + TOL);
    }
}
