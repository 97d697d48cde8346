// Field extraction from tracing events

use crate::level::Level;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata};

/// Exact signed level attached by `Logger`; overrides the event's `tracing` level.
pub(crate) const LEVEL_FIELD: &str = "logutil.level";
pub(crate) const LOGGER_FIELD: &str = "logger";
pub(crate) const CALLER_FIELD: &str = "caller";
const MESSAGE_FIELD: &str = "message";

#[derive(Debug, Default)]
pub(crate) struct EventFields {
    pub message: Option<String>,
    pub level: Option<Level>,
    pub logger: Option<String>,
    pub caller: Option<String>,
    pub extra: Vec<(&'static str, serde_json::Value)>,
}

impl EventFields {
    pub fn from_event(event: &Event<'_>) -> Self {
        let mut fields = EventFields::default();
        event.record(&mut fields);
        fields
    }

    /// The exact level if one was attached, otherwise the mapped `tracing` level.
    pub fn level_for(&self, metadata: &Metadata<'_>) -> Level {
        self.level
            .unwrap_or_else(|| Level::from(*metadata.level()))
    }

    fn record_text(&mut self, field: &Field, value: String) {
        match field.name() {
            MESSAGE_FIELD => self.message = Some(value),
            LOGGER_FIELD => self.logger = Some(value),
            CALLER_FIELD => self.caller = Some(value),
            name => self.extra.push((name, serde_json::Value::String(value))),
        }
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_text(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_owned());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if field.name() == LEVEL_FIELD {
            self.level = i8::try_from(value).ok().map(Level::new);
        } else {
            self.extra.push((field.name(), serde_json::Value::from(value)));
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.extra.push((field.name(), serde_json::Value::from(value)));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.extra.push((field.name(), serde_json::Value::from(value)));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.extra.push((field.name(), serde_json::Value::from(value)));
    }
}
