//! Bayes Lab math utilities.

pub mod math;

pub use math::format::*;
pub use math::odds;
pub use math::rates::*;
