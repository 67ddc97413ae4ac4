//! Bayes Lab common types, IDs, and errors.
//!
//! This crate provides foundational types shared across bl-core modules:
//! - Rate inputs and parameter names
//! - Lab session identifiers
//! - Common error types
//! - Output formats

pub mod error;
pub mod id;
pub mod output;
pub mod rates;
pub mod schema;

pub use error::{Error, Result};
pub use id::SessionId;
pub use output::OutputFormat;
pub use rates::{Parameter, RateInputs, REFERENCE_POPULATION};
pub use schema::SCHEMA_VERSION;
