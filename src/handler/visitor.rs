use serde_json::{Number, Value};
use std::fmt;
use tracing::field::{Field, Visit};

use crate::level::{Severity, FATAL_MARKER};

/// Collects the message and attributes of one event, in call order.
#[derive(Debug, Default)]
pub(crate) struct FieldVisitor {
    pub(crate) message: Option<String>,
    pub(crate) fields: Vec<(&'static str, Value)>,
    fatal: bool,
}

impl FieldVisitor {
    pub(crate) fn severity(&self, level: tracing::Level) -> Severity {
        if self.fatal && level == tracing::Level::ERROR {
            Severity::Fatal
        } else {
            Severity::from_tracing(level)
        }
    }

    fn push(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.message = Some(match value {
                Value::String(message) => message,
                other => other.to_string(),
            });
        } else if !name.starts_with("log.") {
            // `log.*` fields are the bridge metadata of `tracing-log` events
            self.fields.push((name, value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.push(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_i128(&mut self, field: &Field, value: i128) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == FATAL_MARKER {
            self.fatal = value;
            return;
        }
        self.push(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, Value::String(format!("{value:?}")));
    }
}
