//! Structured logging for bayes-lab.
//!
//! Two modes, both on stderr (stdout carries command payloads only):
//! - human-readable console output
//! - JSONL, one object per event, for scripted use
//!
//! ```ignore
//! use bl_core::logging::{init_logging, event_names, LogConfig, LogContext, Stage};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let ctx = LogContext::new(generate_run_id());
//! bl_core::log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "starting");
//! ```
//!
//! The posterior engine never logs; commands log around it.

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, LogContext, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` directives, when present and valid, replace the level from
/// `config`. Calling this twice is harmless: the second call is ignored.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from(config.level).into()));

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(JsonlLayer::stderr())
            .try_init(),
    };
    let _ = result;
}

/// A fresh run correlation ID: "run-" plus 12 hex chars.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}

/// Emit a structured event with the context's correlation IDs.
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::COMPUTE_FINISHED, Stage::Compute, "posterior computed",
///     posterior = result.posterior);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::info!(
            target: $event,
            run_id = %$ctx.run_id,
            session_id = $ctx.session_id.as_deref().unwrap_or(""),
            stage = %$stage,
            message = %$msg,
            $($key = $val,)*
        )
    };
    ($ctx:expr, DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::debug!(
            target: $event,
            run_id = %$ctx.run_id,
            session_id = $ctx.session_id.as_deref().unwrap_or(""),
            stage = %$stage,
            message = %$msg,
            $($key = $val,)*
        )
    };
    ($ctx:expr, WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::warn!(
            target: $event,
            run_id = %$ctx.run_id,
            session_id = $ctx.session_id.as_deref().unwrap_or(""),
            stage = %$stage,
            message = %$msg,
            $($key = $val,)*
        )
    };
    ($ctx:expr, ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::error!(
            target: $event,
            run_id = %$ctx.run_id,
            session_id = $ctx.session_id.as_deref().unwrap_or(""),
            stage = %$stage,
            message = %$msg,
            $($key = $val,)*
        )
    };
}
