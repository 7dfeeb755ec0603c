//! Custom tracing layer for JSONL output.
//!
//! This layer produces machine-parseable JSONL logs on stderr while
//! keeping stdout clean for command payloads.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::{Level, LogEvent, Stage};

/// Correlation fields recorded on spans.
#[derive(Debug, Clone, Default)]
struct SpanContext {
    run_id: Option<String>,
    host_id: Option<String>,
    network: Option<String>,
    stage: Option<String>,
}

/// Collects event fields into a JSON map.
///
/// Correlation fields set by `log_event!` go to `context` instead.
struct JsonFieldVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
    message: Option<String>,
    context: SpanContext,
}

impl JsonFieldVisitor {
    fn new() -> Self {
        JsonFieldVisitor {
            fields: serde_json::Map::new(),
            message: None,
            context: SpanContext::default(),
        }
    }

    fn record_text(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = Some(value),
            // An empty network means none is loaded yet.
            "network" if value.is_empty() => {}
            "run_id" | "host_id" | "network" | "stage" => self.context.set(name, value),
            _ => {
                self.fields
                    .insert(name.to_string(), serde_json::Value::String(value));
            }
        }
    }
}

impl tracing::field::Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.record_text(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.record_text(field.name(), format!("{:?}", value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields.insert(
            field.name().to_string(),
            serde_json::Value::Number(value.into()),
        );
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields.insert(
            field.name().to_string(),
            serde_json::Value::Number(value.into()),
        );
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        // Non-finite floats have no JSON number form.
        let v = match serde_json::Number::from_f64(value) {
            Some(n) => serde_json::Value::Number(n),
            None => serde_json::Value::String(value.to_string()),
        };
        self.fields.insert(field.name().to_string(), v);
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Bool(value));
    }
}

struct SpanContextVisitor {
    context: SpanContext,
}

impl tracing::field::Visit for SpanContextVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.context.set(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.context.set(field.name(), format!("{:?}", value));
    }
}

impl SpanContext {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "run_id" => self.run_id = Some(value),
            "host_id" => self.host_id = Some(value),
            "network" => self.network = Some(value),
            "stage" => self.stage = Some(value),
            _ => {}
        }
    }

    /// Fill unset fields from `outer`.
    fn inherit(&mut self, outer: &SpanContext) {
        if self.run_id.is_none() {
            self.run_id.clone_from(&outer.run_id);
        }
        if self.host_id.is_none() {
            self.host_id.clone_from(&outer.host_id);
        }
        if self.network.is_none() {
            self.network.clone_from(&outer.network);
        }
        if self.stage.is_none() {
            self.stage.clone_from(&outer.stage);
        }
    }
}

/// JSONL tracing layer.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    /// Create a new JSONL layer writing to stderr.
    pub fn stderr() -> Self {
        JsonlLayer {
            writer: Mutex::new(io::stderr()),
        }
    }
}

impl<W: Write> JsonlLayer<W> {
    /// Create a new JSONL layer with a custom writer.
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
        let mut visitor = SpanContextVisitor {
            context: SpanContext::default(),
        };
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.context);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = JsonFieldVisitor::new();
        event.record(&mut visitor);

        // Event fields win, then the innermost span.
        let mut merged = visitor.context;
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(span_ctx) = span.extensions().get::<SpanContext>() {
                    merged.inherit(span_ctx);
                }
            }
        }

        let level: Level = (*event.metadata().level()).into();
        let mut log = LogEvent::new(level, event.metadata().target());
        log.run_id = merged.run_id;
        log.host_id = merged.host_id;
        log.network = merged.network;
        log.stage = merged.stage.as_deref().and_then(Stage::parse);
        log.message = visitor.message;
        log.fields = visitor.fields;

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", log.to_jsonl());
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

    fn capture(f: impl FnOnce()) -> Vec<serde_json::Value> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = JsonlLayer::new(BufWriter(buffer.clone()));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);

        let output = buffer.lock().unwrap();
        String::from_utf8_lossy(&output)
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid JSON line"))
            .collect()
    }

    #[test]
    fn writes_one_json_object_per_event() {
        let lines = capture(|| {
            tracing::info!(target: "test.first", message = "one");
            tracing::warn!(target: "test.second", message = "two");
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["event"], "test.first");
        assert_eq!(lines[0]["message"], "one");
        assert_eq!(lines[1]["level"], "warn");
        assert!(lines[0]["ts"].is_string());
    }

    #[test]
    fn records_typed_fields() {
        let lines = capture(|| {
            tracing::info!(
                target: "test.fields",
                hidden = 3u64,
                score = 0.26,
                exact = true,
                query = "Chuva",
                "scored"
            );
        });
        let fields = &lines[0]["fields"];
        assert_eq!(fields["hidden"], 3);
        assert_eq!(fields["score"], 0.26);
        assert_eq!(fields["exact"], true);
        assert_eq!(fields["query"], "Chuva");
        assert_eq!(lines[0]["message"], "scored");
    }

    #[test]
    fn non_finite_floats_become_strings() {
        let lines = capture(|| {
            tracing::info!(target: "test.inf", value = f64::NEG_INFINITY, "log prob");
        });
        assert_eq!(lines[0]["fields"]["value"], "-inf");
    }

    #[test]
    fn span_context_is_attached() {
        let lines = capture(|| {
            let span = tracing::info_span!("run", run_id = "run-abc", network = "rain");
            let _guard = span.enter();
            tracing::info!(target: "test.span", message = "inside");
        });
        assert_eq!(lines[0]["run_id"], "run-abc");
        assert_eq!(lines[0]["network"], "rain");
        assert!(lines[0].get("host_id").is_none());
    }

    #[test]
    fn log_event_fields_are_lifted_to_the_top_level() {
        let ctx = crate::logging::LogContext::new("run-1", "host-1");
        let lines = capture(|| {
            crate::log_event!(
                ctx,
                INFO,
                crate::logging::event_names::NETWORK_LOADED,
                Stage::Load,
                "network loaded",
                nodes = 4u64
            );
            let ctx = ctx.clone().with_network("weather");
            crate::log_event!(
                ctx,
                WARN,
                crate::logging::event_names::NETWORK_INVALID,
                Stage::Validate,
                "rejected"
            );
        });
        assert_eq!(lines[0]["event"], "network.loaded");
        assert_eq!(lines[0]["run_id"], "run-1");
        assert_eq!(lines[0]["host_id"], "host-1");
        assert_eq!(lines[0]["stage"], "load");
        assert!(lines[0].get("network").is_none());
        assert_eq!(lines[0]["fields"]["nodes"], 4);
        assert!(lines[0]["fields"].get("run_id").is_none());

        assert_eq!(lines[1]["network"], "weather");
        assert_eq!(lines[1]["stage"], "validate");
        assert_eq!(lines[1]["level"], "warn");
        assert!(lines[1].get("fields").is_none());
    }
}
