//! Bayes Lab Core Library
//!
//! This library provides the core functionality for bayes-lab:
//! - Posterior engine and change explainer
//! - Evidence summaries and parameter sweeps
//! - Lab sessions (caller-held memory of the previous result)
//! - Configuration loading and exit codes
//! - Structured logging, output rendering, and JSON schemas
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod exit_codes;
pub mod inference;
pub mod lab;
pub mod logging;
pub mod output;
pub mod schema;
