// Event formatter
// Renders entries as JSON objects or tab-separated console lines, using the configured
// keys, time encoding, and level renderer.

use crate::config::EncoderConfig;
use crate::encoding::Encoding;
use crate::fields::EventFields;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

pub(crate) struct EventFormat {
    encoding: Encoding,
    encoder: EncoderConfig,
}

struct Entry {
    time: serde_json::Value,
    level: Cow<'static, str>,
    logger: Option<String>,
    caller: Option<String>,
    message: String,
    extra: Vec<(&'static str, serde_json::Value)>,
}

impl EventFormat {
    pub fn new(encoding: Encoding, encoder: EncoderConfig) -> Self {
        EventFormat { encoding, encoder }
    }

    fn entry(&self, event: &Event<'_>) -> Entry {
        let metadata = event.metadata();
        let fields = EventFields::from_event(event);
        let level = fields.level_for(metadata);

        let EventFields {
            message,
            logger,
            caller,
            extra,
            ..
        } = fields;

        // An explicit caller field wins, even when empty.
        let caller = match caller {
            Some(caller) => Some(caller).filter(|c| !c.is_empty()),
            None => caller_of(metadata),
        };

        Entry {
            time: self.encoder.time_encoding.encode(chrono::Local::now()),
            level: self.encoder.level_encoder.encode(level),
            logger: logger.filter(|name| !name.is_empty()),
            caller,
            message: message.unwrap_or_default(),
            extra,
        }
    }

    fn write_json(&self, writer: &mut Writer<'_>, entry: &Entry) -> fmt::Result {
        let enc = &self.encoder;
        let mut object = JsonObject::new(writer);

        object.field(&enc.level_key, entry.level.as_ref())?;
        object.field(&enc.time_key, &entry.time)?;
        if let Some(logger) = &entry.logger {
            object.field(&enc.name_key, logger)?;
        }
        if let Some(caller) = &entry.caller {
            object.field(&enc.caller_key, caller)?;
        }
        object.field(&enc.message_key, &entry.message)?;
        for (key, value) in &entry.extra {
            object.field(key, value)?;
        }

        object.finish()
    }

    fn write_console(&self, writer: &mut Writer<'_>, entry: &Entry) -> fmt::Result {
        let enc = &self.encoder;
        let mut elements: Vec<Cow<'_, str>> = Vec::new();

        if !enc.time_key.is_empty() {
            elements.push(match &entry.time {
                serde_json::Value::String(time) => Cow::Borrowed(time.as_str()),
                other => Cow::Owned(other.to_string()),
            });
        }
        if !enc.level_key.is_empty() {
            elements.push(Cow::Borrowed(entry.level.as_ref()));
        }
        if let Some(logger) = entry.logger.as_deref().filter(|_| !enc.name_key.is_empty()) {
            elements.push(Cow::Borrowed(logger));
        }
        if let Some(caller) = entry.caller.as_deref().filter(|_| !enc.caller_key.is_empty()) {
            elements.push(Cow::Borrowed(caller));
        }
        if !enc.message_key.is_empty() {
            elements.push(Cow::Borrowed(entry.message.as_str()));
        }

        writer.write_str(&elements.join("\t"))?;

        if !entry.extra.is_empty() {
            writer.write_char('\t')?;
            let mut object = JsonObject::new(writer);
            for (key, value) in &entry.extra {
                object.field(key, value)?;
            }
            object.finish()?;
        }

        Ok(())
    }
}

impl<S, N> FormatEvent<S, N> for EventFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let entry = self.entry(event);

        match self.encoding {
            Encoding::Json => self.write_json(&mut writer, &entry)?,
            Encoding::Console => self.write_console(&mut writer, &entry)?,
        }

        if !self.encoder.skip_line_ending {
            writer.write_str(&self.encoder.line_ending)?;
        }

        Ok(())
    }
}

fn caller_of(metadata: &Metadata<'_>) -> Option<String> {
    match (metadata.file(), metadata.line()) {
        (Some(file), Some(line)) => Some(format!("{file}:{line}")),
        (Some(file), None) => Some(file.to_string()),
        _ => None,
    }
}

/// Writes a flat JSON object one member at a time, skipping empty keys.
struct JsonObject<'a, 'w> {
    writer: &'a mut Writer<'w>,
    empty: bool,
}

impl<'a, 'w> JsonObject<'a, 'w> {
    fn new(writer: &'a mut Writer<'w>) -> Self {
        JsonObject {
            writer,
            empty: true,
        }
    }

    fn field<V>(&mut self, key: &str, value: &V) -> fmt::Result
    where
        V: Serialize + ?Sized,
    {
        if key.is_empty() {
            return Ok(());
        }

        let key = serde_json::to_string(key).map_err(|_| fmt::Error)?;
        let value = serde_json::to_string(value).map_err(|_| fmt::Error)?;
        let separator = if self.empty { '{' } else { ',' };
        self.empty = false;

        write!(self.writer, "{separator}{key}:{value}")
    }

    fn finish(self) -> fmt::Result {
        self.writer.write_str(if self.empty { "{}" } else { "}" })
    }
}
