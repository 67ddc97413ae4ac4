//! Display formatting for probabilities and natural-frequency counts.
//!
//! The engine returns unrounded values; these helpers are for the layers
//! that render them.

use super::rates::unit_to_percent;

/// Format a unit probability as a percentage with two decimals ("16.10%").
pub fn format_percent(p: f64) -> String {
    format!("{}%", fixed2(unit_to_percent(p)))
}

/// Format a percentage-point magnitude with two decimals ("2.35").
pub fn format_points(points: f64) -> String {
    fixed2(points)
}

/// Two-decimal rendering where an exact midpoint rounds away from zero
/// (0.625 -> "0.63"). `{:.2}` alone sends those to the even digit.
///
/// A binary float sits exactly halfway between hundredths only when it is
/// an odd multiple of 1/8, so that is the one case handled by hand.
fn fixed2(x: f64) -> String {
    if x == 0.0 {
        return "0.00".to_string();
    }
    let eighths = x.abs() * 8.0;
    let midpoint = eighths < 1e15 && eighths.fract() == 0.0 && eighths % 2.0 == 1.0;
    if !midpoint {
        return format!("{:.2}", x);
    }
    let hundredths = (x.abs() * 100.0).ceil() as u64;
    let sign = if x < 0.0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
}

/// Round a count half-up to the nearest whole number (9.5 -> 10, 49.5 -> 50).
///
/// NaN rounds to 0; infinities saturate.
pub fn round_count(count: f64) -> i64 {
    let whole = count.floor();
    let rounded = if count - whole >= 0.5 { whole + 1.0 } else { whole };
    rounded as i64
}
