//! JSON record handler.
//!
//! [`JsonHandler`] is a [`tracing_subscriber::Layer`] that drops events below
//! the minimum severity and writes every other event as one JSON object per
//! line:
//!
//! ```text
//! {"time":"2024-05-01T10:30:00.123+02:00","level":"INFO","target":"app","msg":"started","port":8080}
//! ```
//!
//! With source tagging enabled a `source` object (`file`, `line`, `module`)
//! follows `level`. Caller attributes never replace these keys; an attribute
//! named `level` is written as `fields.level`.

mod timestamp;
mod visitor;

pub use timestamp::TimeFormat;

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::subscriber::Interest;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::level::Severity;
use crate::writer::SinkWriter;
use visitor::FieldVisitor;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const SOURCE_KEY: &str = "source";
pub const TARGET_KEY: &str = "target";
pub const MESSAGE_KEY: &str = "msg";

/// Keys written by the handler itself. A caller attribute with one of these
/// names is written as `fields.<name>` instead.
pub const RESERVED_KEYS: [&str; 5] = [TIME_KEY, LEVEL_KEY, SOURCE_KEY, TARGET_KEY, MESSAGE_KEY];
const RENAMED_FIELD_PREFIX: &str = "fields.";

/// Rewrites one top-level attribute; returning `None` drops it.
pub type AttrRewrite = Arc<dyn Fn(&str, Value) -> Option<Value> + Send + Sync>;

/// Options applied to every record a [`JsonHandler`] writes.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    pub min_level: Severity,
    pub add_source: bool,
    pub time_format: Option<TimeFormat>,
    pub replace_attr: Option<AttrRewrite>,
}

impl std::fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("min_level", &self.min_level)
            .field("add_source", &self.add_source)
            .field("time_format", &self.time_format)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

/// Serializes events as JSON lines into a [`SinkWriter`].
#[derive(Debug, Clone)]
pub struct JsonHandler {
    options: HandlerOptions,
    writer: SinkWriter,
}

impl JsonHandler {
    #[must_use]
    pub fn new(writer: SinkWriter, options: HandlerOptions) -> Self {
        Self { options, writer }
    }

    #[must_use]
    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    #[must_use]
    pub fn writer(&self) -> &SinkWriter {
        &self.writer
    }

    fn insert(&self, record: &mut Map<String, Value>, key: &str, value: Value) {
        let value = match &self.options.replace_attr {
            Some(rewrite) => rewrite(key, value),
            None => Some(value),
        };
        if let Some(value) = value {
            record.insert(key.to_string(), value);
        }
    }

    /// Builds the JSON line for one event, newline included.
    pub(crate) fn render(
        &self,
        metadata: &Metadata<'_>,
        severity: Severity,
        visitor: FieldVisitor,
        now: &DateTime<Local>,
    ) -> Vec<u8> {
        let mut record = Map::new();

        let time = match &self.options.time_format {
            Some(format) => format.render(now),
            None => timestamp::render_default(now),
        };
        self.insert(&mut record, TIME_KEY, Value::String(time));
        self.insert(&mut record, LEVEL_KEY, Value::from(severity.as_str()));

        if self.options.add_source {
            let mut source = Map::new();
            if let Some(file) = metadata.file() {
                source.insert("file".to_string(), Value::from(file));
            }
            if let Some(line) = metadata.line() {
                source.insert("line".to_string(), Value::from(line));
            }
            if let Some(module) = metadata.module_path() {
                source.insert("module".to_string(), Value::from(module));
            }
            self.insert(&mut record, SOURCE_KEY, Value::Object(source));
        }

        self.insert(&mut record, TARGET_KEY, Value::from(metadata.target()));
        self.insert(
            &mut record,
            MESSAGE_KEY,
            Value::String(visitor.message.unwrap_or_default()),
        );
        for (key, value) in visitor.fields {
            if RESERVED_KEYS.contains(&key) {
                self.insert(&mut record, &format!("{RENAMED_FIELD_PREFIX}{key}"), value);
            } else {
                self.insert(&mut record, key, value);
            }
        }

        let mut line = Value::Object(record).to_string().into_bytes();
        line.push(b'\n');
        line
    }
}

impl<S: Subscriber> Layer<S> for JsonHandler {
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        // several handlers with different levels may be live at once
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        // fatal events are ERROR events, told apart only once their fields are read
        let floor = self.options.min_level.min(Severity::Error);
        Severity::from_tracing(*metadata.level()) >= floor
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let severity = visitor.severity(*metadata.level());
        if severity < self.options.min_level {
            return;
        }

        let line = self.render(metadata, severity, visitor, &Local::now());
        if let Err(err) = self.writer.write_record(&line) {
            eprintln!("loginit: failed to write log record to {}: {err}", self.writer.kind());
        }
    }
}

#[cfg(test)]
#[path = "../handler_tests.rs"]
mod tests;
