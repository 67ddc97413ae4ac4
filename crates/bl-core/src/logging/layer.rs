//! Tracing layer that writes one JSON object per event.
//!
//! Writes to stderr by default so stdout stays reserved for command output.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::Level;

/// Correlation fields recorded on a span.
#[derive(Debug, Clone, Default)]
struct SpanContext {
    run_id: Option<String>,
    session_id: Option<String>,
    stage: Option<String>,
}

impl SpanContext {
    fn set(&mut self, name: &str, value: String) {
        if value.is_empty() {
            return;
        }
        match name {
            "run_id" => self.run_id = Some(value),
            "session_id" => self.session_id = Some(value),
            "stage" => self.stage = Some(value),
            _ => {}
        }
    }
}

impl Visit for SpanContext {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set(field.name(), format!("{:?}", value));
    }
}

/// Collects event fields.
///
/// `run_id`, `session_id`, `stage` and `event` are hoisted to the top level;
/// everything else lands under `fields`.
#[derive(Default)]
struct EventVisitor {
    context: SpanContext,
    event: Option<String>,
    message: Option<String>,
    fields: Map<String, Value>,
}

impl EventVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
            }
            "event" => {
                if let Value::String(s) = value {
                    self.event = Some(s);
                }
            }
            name @ ("run_id" | "session_id" | "stage") => {
                if let Value::String(s) = value {
                    self.context.set(name, s);
                }
            }
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // Non-finite floats have no JSON number form.
        let v = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.insert(field, v);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
}

/// JSONL tracing layer.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        JsonlLayer {
            writer: Mutex::new(io::stderr()),
        }
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut context = SpanContext::default();
        attrs.record(&mut context);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(context);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        // Event fields win over the innermost span, which wins over outer spans.
        let mut context = visitor.context.clone();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(span_ctx) = span.extensions().get::<SpanContext>() {
                    if context.run_id.is_none() {
                        context.run_id.clone_from(&span_ctx.run_id);
                    }
                    if context.session_id.is_none() {
                        context.session_id.clone_from(&span_ctx.session_id);
                    }
                    if context.stage.is_none() {
                        context.stage.clone_from(&span_ctx.stage);
                    }
                }
            }
        }

        let level: Level = (*event.metadata().level()).into();
        let name = visitor
            .event
            .unwrap_or_else(|| event.metadata().target().to_string());

        let mut obj = Map::new();
        obj.insert("ts".to_string(), json!(Utc::now().to_rfc3339()));
        obj.insert("level".to_string(), json!(level));
        obj.insert("event".to_string(), json!(name));
        if let Some(id) = context.run_id {
            obj.insert("run_id".to_string(), json!(id));
        }
        if let Some(id) = context.session_id {
            obj.insert("session_id".to_string(), json!(id));
        }
        if let Some(stage) = context.stage {
            obj.insert("stage".to_string(), json!(stage));
        }
        if let Some(msg) = visitor.message {
            obj.insert("message".to_string(), json!(msg));
        }
        if !visitor.fields.is_empty() {
            obj.insert("fields".to_string(), Value::Object(visitor.fields));
        }

        let line = serde_json::to_string(&Value::Object(obj)).unwrap_or_default();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    struct BufWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Value> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = JsonlLayer::new(BufWriter(buffer.clone()));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);

        let output = buffer.lock().unwrap();
        String::from_utf8_lossy(&output)
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid json line"))
            .collect()
    }

    #[test]
    fn records_level_message_and_target() {
        let lines = capture(|| {
            tracing::warn!(target: "input.rejected", message = "sensitivity out of range");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "warn");
        assert_eq!(lines[0]["event"], "input.rejected");
        assert_eq!(lines[0]["message"], "sensitivity out of range");
        assert!(lines[0]["ts"].is_string());
    }

    #[test]
    fn hoists_correlation_fields() {
        let lines = capture(|| {
            tracing::info!(
                target: "compute.finished",
                run_id = "run-abc",
                stage = "compute",
                posterior = 0.25,
                steps = 3u64,
                clamped = false,
                message = "done"
            );
        });
        assert_eq!(lines[0]["run_id"], "run-abc");
        assert_eq!(lines[0]["stage"], "compute");
        assert_eq!(lines[0]["fields"]["posterior"], 0.25);
        assert_eq!(lines[0]["fields"]["steps"], 3);
        assert_eq!(lines[0]["fields"]["clamped"], false);
        assert!(lines[0]["fields"].get("run_id").is_none());
    }

    #[test]
    fn inherits_span_context() {
        let lines = capture(|| {
            let span = tracing::info_span!("lab", run_id = "run-1", session_id = "lab-x");
            let _guard = span.enter();
            tracing::info!(target: "lab.step", stage = "lab", message = "step");
        });
        assert_eq!(lines[0]["run_id"], "run-1");
        assert_eq!(lines[0]["session_id"], "lab-x");
        assert_eq!(lines[0]["stage"], "lab");
    }

    #[test]
    fn explicit_event_field_overrides_target() {
        let lines = capture(|| {
            tracing::info!(target: "bl_core::event", event = "lab.finished", message = "bye");
        });
        assert_eq!(lines[0]["event"], "lab.finished");
    }

    #[test]
    fn non_finite_floats_become_strings() {
        let lines = capture(|| {
            tracing::info!(target: "t", lr = f64::INFINITY);
        });
        assert_eq!(lines[0]["fields"]["lr"], "inf");
    }
}
