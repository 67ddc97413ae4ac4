//! Output formats every command accepts via `--format`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default for machine consumption)
    #[default]
    Json,

    /// One JSON object per line (lab sessions, sweeps)
    Jsonl,

    /// Human-readable Markdown
    Md,

    /// One-line summary for quick checks
    Summary,

    /// Narrative natural-frequency explanation
    Prose,

    /// Minimal output (exit code only)
    Exitcode,
}

impl OutputFormat {
    /// Whether this format is intended for machines.
    pub fn is_machine(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Jsonl)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Md => write!(f, "md"),
            OutputFormat::Summary => write!(f, "summary"),
            OutputFormat::Prose => write!(f, "prose"),
            OutputFormat::Exitcode => write!(f, "exitcode"),
        }
    }
}
