use super::{non_string_key, Format};
use crate::core::{Record, TimestampFormat, Value, ERROR_KEY};
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

/// One flat JSON object per record
///
/// Keys are the configured built-in field names plus every pair of the
/// record. Numbers, strings and booleans are written natively, `nil` as
/// `null`, and everything else as its textual description.
#[derive(Debug, Clone)]
pub struct JsonFormat {
    pretty: bool,
    line_separated: bool,
    timestamp_format: TimestampFormat,
}

impl JsonFormat {
    /// Compact objects, one per line.
    pub fn new() -> Self {
        Self {
            pretty: false,
            line_separated: true,
            timestamp_format: TimestampFormat::Rfc3339,
        }
    }

    /// Indent with four spaces.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Terminate every object with a newline.
    #[must_use]
    pub fn line_separated(mut self, line_separated: bool) -> Self {
        self.line_separated = line_separated;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn timestamp(&self, record: &Record) -> JsonValue {
        match self.timestamp_format {
            TimestampFormat::Unix => JsonValue::from(record.time.timestamp()),
            TimestampFormat::UnixMillis => JsonValue::from(record.time.timestamp_millis()),
            _ => JsonValue::String(self.timestamp_format.format(&record.time)),
        }
    }

    fn encode(&self, props: &Map<String, JsonValue>) -> serde_json::Result<Vec<u8>> {
        if self.pretty {
            let mut buf = Vec::with_capacity(256);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            props.serialize(&mut ser)?;
            Ok(buf)
        } else {
            serde_json::to_vec(props)
        }
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl Format for JsonFormat {
    fn format(&self, record: &Record) -> Vec<u8> {
        let names = &record.key_names;
        let mut props = Map::new();

        props.insert(names.time.clone(), self.timestamp(record));
        props.insert(
            names.level.clone(),
            JsonValue::String(record.level.as_str().to_string()),
        );
        props.insert(names.msg.clone(), JsonValue::String(record.msg.clone()));
        props.insert(names.caller.clone(), JsonValue::String(record.caller_string()));
        if let Some(id) = record.request_id() {
            props.insert(names.request_id.clone(), JsonValue::String(id.to_string()));
        }

        for (key, value) in record.pairs() {
            match key.as_str() {
                Some(k) => {
                    props.insert(k.to_string(), json_value(value));
                }
                None => {
                    props.insert(ERROR_KEY.to_string(), JsonValue::String(non_string_key(key)));
                }
            }
        }

        let mut bytes = match self.encode(&props) {
            Ok(bytes) => bytes,
            Err(e) => {
                let mut fallback = Map::new();
                fallback.insert(ERROR_KEY.to_string(), JsonValue::String(e.to_string()));
                self.encode(&fallback).unwrap_or_default()
            }
        };
        if self.line_separated {
            bytes.push(b'\n');
        }
        bytes
    }
}

/// JSON rendering of a single value after the shared coercion.
fn json_value(value: &Value) -> JsonValue {
    match value.coerce() {
        Value::Nil => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Int(i) => JsonValue::from(i),
        Value::Uint(u) => JsonValue::from(u),
        Value::Float(f) => Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(f.to_string())),
        Value::Str(s) => JsonValue::String(s),
        Value::Time(t) => JsonValue::String(TimestampFormat::DateTime.format(&t)),
        other => JsonValue::String(other.describe()),
    }
}
