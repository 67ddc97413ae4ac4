//! Fuzz target for the posterior engine and change explainer.
//!
//! Any f64 triple, including NaN and infinities, must compute without
//! panicking. In-range triples must give a probability.

#![no_main]

use arbitrary::Arbitrary;
use bl_common::RateInputs;
use bl_core::inference::{compute, explain_change};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    before: (f64, f64, f64),
    after: (f64, f64, f64),
}

fuzz_target!(|input: Input| {
    let (p, s, t) = input.before;
    let before = compute(RateInputs::new(p, s, t));
    let (p, s, t) = input.after;
    let inputs = RateInputs::new(p, s, t);
    let after = compute(inputs);

    let _ = explain_change(Some(&before), &after);

    if inputs.first_out_of_range().is_none() {
        assert!((0.0..=1.0).contains(&after.posterior));
    }
});
