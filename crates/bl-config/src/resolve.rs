//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path → defaults.

use std::path::{Path, PathBuf};

/// Discovered settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Path to bayes-lab.json (None means built-in defaults).
    pub config: Option<PathBuf>,

    /// Where the path came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Direct path to a settings file.
pub const ENV_CONFIG_PATH: &str = "BAYES_LAB_CONFIG";
/// Directory containing `bayes-lab.json`.
pub const ENV_CONFIG_DIR: &str = "BAYES_LAB_CONFIG_DIR";

/// Standard settings file name.
pub const CONFIG_FILENAME: &str = "bayes-lab.json";

/// Application name for XDG directories.
const APP_NAME: &str = "bayes-lab";

/// Resolve the settings path from the process environment.
///
/// 1. Explicit CLI path
/// 2. BAYES_LAB_CONFIG
/// 3. BAYES_LAB_CONFIG_DIR + filename (only if the file exists)
/// 4. XDG config directory (~/.config/bayes-lab/), only if the file exists
/// 5. Built-in defaults (None)
///
/// Explicit paths (1 and 2) are returned even when missing so that loading
/// reports the error instead of silently falling back to defaults.
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    resolve_config_with(cli_path, |key| std::env::var(key).ok(), dirs::config_dir())
}

/// Resolution with an injectable environment and XDG base directory.
pub fn resolve_config_with<F>(
    cli_path: Option<&Path>,
    env_lookup: F,
    xdg_config_dir: Option<PathBuf>,
) -> ConfigPaths
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = cli_path {
        return ConfigPaths {
            config: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Some(env_path) = env_lookup(ENV_CONFIG_PATH).filter(|v| !v.is_empty()) {
        return ConfigPaths {
            config: Some(PathBuf::from(env_path)),
            source: ConfigSource::Environment,
        };
    }

    if let Some(dir) = env_lookup(ENV_CONFIG_DIR).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(dir).join(CONFIG_FILENAME);
        if path.exists() {
            return ConfigPaths {
                config: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(xdg) = xdg_config_dir {
        let path = xdg.join(APP_NAME).join(CONFIG_FILENAME);
        if path.exists() {
            return ConfigPaths {
                config: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    ConfigPaths::default()
}

/// The default XDG location for the settings file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join(CONFIG_FILENAME))
}
