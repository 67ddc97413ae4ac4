//! Event vocabulary shared by the `log_event!` macro and the JSONL layer.
//!
//! Every event carries the run correlation ID, an optional lab session ID,
//! and the stage of the command that emitted it.

use serde::{Deserialize, Serialize};

/// Severity as written in JSONL output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of a bayes-lab command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and argument handling.
    Init,
    /// Config resolution and scenario catalog loading.
    Load,
    /// Posterior computation and sweeps.
    Compute,
    /// Change explanation.
    Explain,
    /// Interactive lab loop.
    Lab,
    /// Writing command output.
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Compute => "compute",
            Stage::Explain => "explain",
            Stage::Lab => "lab",
            Stage::Render => "render",
        };
        write!(f, "{}", s)
    }
}

/// Stable event names. They become the tracing target of each event.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INPUT_REJECTED: &str = "input.rejected";

    pub const COMPUTE_FINISHED: &str = "compute.finished";
    pub const SWEEP_FINISHED: &str = "sweep.finished";
    pub const EXPLAIN_FINISHED: &str = "explain.finished";

    pub const LAB_STARTED: &str = "lab.started";
    pub const LAB_STEP: &str = "lab.step";
    pub const LAB_REJECTED: &str = "lab.rejected";
    pub const LAB_FINISHED: &str = "lab.finished";
}

/// Correlation IDs shared by every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    /// Lab session ID once a lab session exists.
    pub session_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_carries_session() {
        let ctx = LogContext::new("run-abc");
        assert!(ctx.session_id.is_none());
        let ctx = ctx.with_session_id("lab-20260115-143022-b2c3d4");
        assert_eq!(ctx.run_id, "run-abc");
        assert_eq!(ctx.session_id.as_deref(), Some("lab-20260115-143022-b2c3d4"));
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"warn\"");
    }

    #[test]
    fn stage_display_matches_serde() {
        for stage in [
            Stage::Init,
            Stage::Load,
            Stage::Compute,
            Stage::Explain,
            Stage::Lab,
            Stage::Render,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn level_from_tracing() {
        assert_eq!(Level::from(tracing::Level::DEBUG), Level::Debug);
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
    }
}
