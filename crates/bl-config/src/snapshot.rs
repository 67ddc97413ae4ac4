//! Configuration snapshots for provenance.
//!
//! A snapshot records which settings file a run used and its content hash, so
//! outputs can be traced back to the exact configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::{ConfigPaths, ConfigSource};
use crate::scenario::ScenarioCatalog;
use crate::settings::LabConfig;

/// The settings a run used, as reported by `bayes-lab check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub timestamp: DateTime<Utc>,

    pub schema_version: String,

    #[serde(default)]
    pub config_path: Option<String>,

    /// Which resolution step found the file.
    pub config_source: String,

    /// SHA-256 of the settings file content ("none" hashed for defaults).
    pub config_hash: String,

    pub summary: ConfigSummary,
}

/// Effective values after defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub reference_population: f64,
    pub change_tolerance: f64,
    pub scenario_count: usize,
    pub custom_scenario_count: usize,
}

impl ConfigSummary {
    fn from_config(config: &LabConfig) -> Self {
        Self {
            reference_population: config.reference_population,
            change_tolerance: config.change_tolerance,
            scenario_count: ScenarioCatalog::from_config(config).len(),
            custom_scenario_count: config.scenarios.len(),
        }
    }
}

impl ConfigSnapshot {
    /// Snapshot of settings loaded from `paths`, hashing the raw file content.
    pub fn new(config: &LabConfig, paths: &ConfigPaths, raw_json: Option<&str>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_path: paths.config.as_ref().map(|p| p.display().to_string()),
            config_source: paths.source.to_string(),
            config_hash: hash_content(raw_json.unwrap_or("none")),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Snapshot with only defaults (no settings file loaded).
    pub fn defaults_only() -> Self {
        let config = LabConfig::default();
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_path: None,
            config_source: ConfigSource::BuiltinDefault.to_string(),
            config_hash: hash_content("none"),
            summary: ConfigSummary::from_config(&config),
        }
    }

    /// Whether two snapshots describe the same settings content.
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// First 12 hex chars of the hash.
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

/// Lowercase hex SHA-256 of `content`.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
