//! JSON-lines tracing layer.
//!
//! Every event becomes one object on its own line:
//!
//! ```json
//! {"ts":"...","level":"debug","event":"probe.ok","tool":"hostinfo","stage":"query","message":"probe succeeded","fields":{"probe":"clock"}}
//! ```
//!
//! Fields recorded on enclosing spans (`tool`, `pid`) are lifted to the top
//! level; the innermost span wins when two spans record the same name.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::level_name;

/// Span fields lifted onto every event logged inside the span.
const LIFTED_SPAN_FIELDS: [&str; 3] = ["tool", "stage", "pid"];

/// Collects tracing fields into a JSON map, keeping `message` apart.
#[derive(Default)]
struct FieldMap {
    message: Option<String>,
    values: Map<String, Value>,
}

impl FieldMap {
    fn put(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldMap {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::from(format!("{:?}", value)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.put(field, Value::Number(n));
        }
    }
}

/// Span extension holding the lifted fields of one span.
struct SpanFields(Map<String, Value>);

/// Writes each event as a JSON line to `W` (stderr by default).
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
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
        let mut collected = FieldMap::default();
        attrs.record(&mut collected);
        collected
            .values
            .retain(|name, _| LIFTED_SPAN_FIELDS.contains(&name.as_str()));

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(collected.values));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut line = Map::new();
        line.insert("ts".into(), Value::from(Utc::now().to_rfc3339()));
        line.insert("level".into(), Value::from(level_name(meta.level())));
        line.insert("event".into(), Value::from(meta.target()));

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    for (name, value) in fields {
                        line.entry(name.clone()).or_insert_with(|| value.clone());
                    }
                }
            }
        }

        let mut collected = FieldMap::default();
        event.record(&mut collected);

        // The event's own stage beats any inherited one.
        if let Some(stage) = collected.values.remove("stage") {
            line.insert("stage".into(), stage);
        }
        if let Some(message) = collected.message {
            line.insert("message".into(), Value::from(message));
        }
        if !collected.values.is_empty() {
            line.insert("fields".into(), Value::Object(collected.values));
        }

        let Ok(json) = serde_json::to_string(&line) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", json);
        }
    }
}
