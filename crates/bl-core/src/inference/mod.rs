//! Posterior engine and change explainer.

pub mod evidence;
pub mod explain;
pub mod posterior;
pub mod sweep;

pub use evidence::EvidenceSummary;
pub use explain::{
    explain_change, explain_change_detailed, ChangeExplanation, ChangeSet, ExplainOptions,
    PosteriorShift, ONBOARDING_MESSAGE, UNCHANGED_MESSAGE,
};
pub use posterior::{compute, compute_with_population, PosteriorResult, RoundedFrequencies};
pub use sweep::{sweep, SweepPoint, MAX_SWEEP_POINTS};
