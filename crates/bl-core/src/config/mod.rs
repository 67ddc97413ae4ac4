//! Configuration loading for bayes-lab commands.
//!
//! Resolves the settings file (CLI > env > XDG > defaults), parses it,
//! runs validation, and keeps the raw content hash for the config snapshot.

pub use bl_config::validate::ValidationError;
pub use bl_config::{ConfigPaths, ConfigSnapshot, ConfigSource, LabConfig, ScenarioCatalog};

use std::path::{Path, PathBuf};

use bl_config::snapshot::hash_content;
use bl_config::{resolve_config, validate_config};
use thiserror::Error;

use crate::exit_codes::ExitCode;
use crate::inference::ExplainOptions;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(ValidationError),

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ConfigError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ConfigError::IoError { .. } => ExitCode::IoError,
            _ => ExitCode::ConfigError,
        }
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::VersionMismatch { expected, actual } => {
                ConfigError::VersionMismatch { expected, actual }
            }
            other => ConfigError::ValidationError(other),
        }
    }
}

impl From<ConfigError> for bl_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { .. } | ConfigError::IoError { .. } => {
                bl_common::Error::Config(err.to_string())
            }
            ConfigError::VersionMismatch { .. } => {
                bl_common::Error::SchemaValidation(err.to_string())
            }
            ConfigError::ParseError { .. } | ConfigError::ValidationError(_) => {
                bl_common::Error::InvalidConfig(err.to_string())
            }
        }
    }
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: LabConfig,
    /// Where the settings came from.
    pub paths: ConfigPaths,
    /// SHA-256 of the file content (None if using defaults).
    pub config_hash: Option<String>,
    raw: Option<String>,
}

impl ResolvedConfig {
    /// Built-in defaults, no file.
    pub fn defaults() -> Self {
        ResolvedConfig {
            config: LabConfig::default(),
            paths: ConfigPaths::default(),
            config_hash: None,
            raw: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.paths.config.is_none()
    }

    /// Merged scenario catalog.
    pub fn catalog(&self) -> ScenarioCatalog {
        ScenarioCatalog::from_config(&self.config)
    }

    pub fn explain_options(&self) -> ExplainOptions {
        ExplainOptions::with_tolerance(self.config.change_tolerance)
    }

    pub fn population(&self) -> f64 {
        self.config.reference_population
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        if self.is_default() {
            return ConfigSnapshot::defaults_only();
        }
        ConfigSnapshot::new(&self.config, &self.paths, self.raw.as_deref())
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit settings file (highest priority).
    pub config_path: Option<PathBuf>,
}

/// Load configuration with the standard resolution order.
///
/// 1. Explicit CLI path (via ConfigOptions)
/// 2. BAYES_LAB_CONFIG, then BAYES_LAB_CONFIG_DIR
/// 3. XDG config home (~/.config/bayes-lab/bayes-lab.json)
/// 4. Built-in defaults
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    load_config_from(resolve_config(options.config_path.as_deref()))
}

/// Load from already-resolved paths.
pub fn load_config_from(paths: ConfigPaths) -> Result<ResolvedConfig, ConfigError> {
    let Some(path) = paths.config.clone() else {
        let resolved = ResolvedConfig::defaults();
        validate_config(&resolved.config)?;
        return Ok(resolved);
    };

    let (config, raw) = load_config_file(&path)?;
    validate_config(&config)?;

    Ok(ResolvedConfig {
        config,
        paths,
        config_hash: Some(hash_content(&raw)),
        raw: Some(raw),
    })
}

fn load_config_file(path: &Path) -> Result<(LabConfig, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: LabConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok((config, content))
}
