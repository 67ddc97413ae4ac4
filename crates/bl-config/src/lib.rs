//! Bayes Lab configuration loading and validation.
//!
//! This crate provides:
//! - The scenario catalog (built-in presets plus configured entries)
//! - Typed lab settings for bayes-lab.json
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for provenance

pub mod resolve;
pub mod scenario;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use resolve::{resolve_config, resolve_config_with, ConfigPaths, ConfigSource};
pub use scenario::{find_scenario, list_scenarios, Scenario, ScenarioCatalog};
pub use settings::LabConfig;
pub use snapshot::ConfigSnapshot;
pub use validate::{
    validate_catalog, validate_config, validate_rates, validate_scenario, ValidationError,
    ValidationResult,
};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
