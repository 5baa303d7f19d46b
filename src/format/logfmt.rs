use super::{escape, logfmt_value, non_string_key, Format};
use crate::core::{Record, TimestampFormat, ERROR_KEY};

/// Machine-parseable `key=value` lines
///
/// Built-in fields come first, in this order: time, level, message,
/// caller and request id (when present). The record's pairs follow.
///
/// Time values go through the same escaping as strings. The default
/// `DateTime` layout contains a space, so the record time is quoted unless
/// another layout is chosen, and time values in the pairs, which always use
/// that layout, are always quoted. Consumers expecting a bare
/// `time=2025-01-08T10:30:45` token should pick a layout without spaces,
/// such as [`TimestampFormat::Rfc3339`] or one of the numeric ones.
///
/// ```text
/// time="2025-01-08 10:30:45.123" level=info msg="request served" location=server.rs:42 status=200
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormat {
    timestamp_format: TimestampFormat,
}

impl LogfmtFormat {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Format for LogfmtFormat {
    fn format(&self, record: &Record) -> Vec<u8> {
        let names = &record.key_names;
        let mut parts: Vec<(&str, String)> = Vec::with_capacity(5 + record.kv.len() / 2);

        parts.push((
            names.time.as_str(),
            escape(&self.timestamp_format.format(&record.time)).into_owned(),
        ));
        parts.push((names.level.as_str(), record.level.as_str().to_string()));
        parts.push((names.msg.as_str(), escape(&record.msg).into_owned()));
        parts.push((names.caller.as_str(), escape(&record.caller_string()).into_owned()));
        if let Some(id) = record.request_id() {
            parts.push((names.request_id.as_str(), escape(id).into_owned()));
        }

        for (key, value) in record.pairs() {
            match key.as_str() {
                Some(k) => parts.push((k, logfmt_value(value))),
                None => parts.push((ERROR_KEY, escape(&non_string_key(key)).into_owned())),
            }
        }

        let mut line = String::with_capacity(parts.iter().map(|(k, v)| k.len() + v.len() + 2).sum());
        for (i, (key, value)) in parts.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line.push('\n');
        line.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, RequestContext, Value};
    use crate::kv;
    use chrono::{Local, TimeZone};

    fn record(kv: Vec<Value>) -> Record {
        let time = Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime");
        let mut record = Record::new(Level::Info, "request served", kv).with_time(time);
        record.custom_caller = Some("server.rs:42".to_string());
        record
    }

    fn render(record: &Record) -> String {
        String::from_utf8(LogfmtFormat::new().format(record)).unwrap()
    }

    #[test]
    fn test_builtin_fields_first() {
        let line = render(&record(kv!["status", 200, "ok", true]));
        assert_eq!(
            line,
            "time=\"2025-01-08 10:30:45.000\" level=info msg=\"request served\" \
             location=server.rs:42 status=200 ok=true\n"
        );
    }

    #[test]
    fn test_request_id_after_caller() {
        let r = record(kv!["a", 1]).with_context(RequestContext::new().with_request_id("r-1"));
        let line = render(&r);
        assert!(line.contains("location=server.rs:42 request_id=r-1 a=1\n"));
    }

    #[test]
    fn test_escaped_values() {
        let line = render(&record(kv!["quote", "he said \"hi\"\n", "tab", "a\tb"]));
        assert!(line.contains("quote=\"he said \\\"hi\\\"\\n\""));
        assert!(line.contains(" tab=a\\tb\n"));
    }

    #[test]
    fn test_float_and_nil() {
        let line = render(&record(kv!["ratio", 0.5, "missing", Value::Nil]));
        assert!(line.contains("ratio=0.500 missing=nil"));
    }

    #[test]
    fn test_non_string_key() {
        let line = render(&record(vec![Value::from(7), Value::from("x")]));
        assert!(line.ends_with("error=\"7 is not a string key\"\n"));
    }

    #[test]
    fn test_custom_key_names() {
        let mut r = record(kv![]);
        r.key_names.msg = "message".to_string();
        r.key_names.time = "ts".to_string();
        let line = render(&r);
        assert!(line.starts_with("ts="));
        assert!(line.contains(" message=\"request served\" "));
    }

    #[test]
    fn test_time_values_are_quoted() {
        let r = record(kv![]);
        let at = r.time;
        let line = render(&record(kv!["at", at]));
        assert!(line.starts_with("time=\"2025-01-08 10:30:45.000\" "), "line: {}", line);
        assert!(line.ends_with(" at=\"2025-01-08 10:30:45.000\"\n"), "line: {}", line);

        let fmt = LogfmtFormat::new().with_timestamp_format(TimestampFormat::Rfc3339);
        let line = String::from_utf8(fmt.format(&r)).unwrap();
        assert!(!line.starts_with("time=\""), "line: {}", line);
    }

    #[test]
    fn test_invalid_custom_timestamp_does_not_panic() {
        let fmt =
            LogfmtFormat::new().with_timestamp_format(TimestampFormat::Custom("%Q".to_string()));
        let line = String::from_utf8(fmt.format(&record(kv![]))).unwrap();
        assert!(line.starts_with("time=\"2025-01-08 10:30:45.000\" "), "line: {}", line);
    }

    #[test]
    fn test_numeric_timestamp() {
        let r = record(kv![]);
        let fmt = LogfmtFormat::new().with_timestamp_format(TimestampFormat::Unix);
        let line = String::from_utf8(fmt.format(&r)).unwrap();
        assert!(line.starts_with(&format!("time={} ", r.time.timestamp())));
    }
}
