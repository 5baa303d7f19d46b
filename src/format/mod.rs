//! Record formatters
//!
//! A formatter turns a [`Record`] into the bytes a stream handler writes.
//! Formatting never fails: values that cannot be rendered natively fall back
//! to their textual description.

mod json;
mod logfmt;
mod terminal;

pub use json::JsonFormat;
pub use logfmt::LogfmtFormat;
pub use terminal::TerminalFormat;

use crate::core::{Record, TimestampFormat, Value};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;

pub trait Format: Send + Sync {
    fn format(&self, record: &Record) -> Vec<u8>;
}

/// Shared formatter reference
pub type FormatRef = Arc<dyn Format>;

impl<F: Format + ?Sized> Format for Arc<F> {
    fn format(&self, record: &Record) -> Vec<u8> {
        (**self).format(record)
    }
}

impl<F: Format + ?Sized> Format for Box<F> {
    fn format(&self, record: &Record) -> Vec<u8> {
        (**self).format(record)
    }
}

/// Formatter backed by a closure
///
/// ```
/// use kvlog::format::{Format, FormatFunc};
/// use kvlog::prelude::*;
///
/// let fmt = FormatFunc::new(|r: &Record| format!("{}\n", r.msg).into_bytes());
/// let record = Record::new(Level::Info, "hi", kv![]);
/// assert_eq!(fmt.format(&record), b"hi\n");
/// ```
pub struct FormatFunc<F> {
    f: F,
}

impl<F> FormatFunc<F>
where
    F: Fn(&Record) -> Vec<u8> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Format for FormatFunc<F>
where
    F: Fn(&Record) -> Vec<u8> + Send + Sync,
{
    fn format(&self, record: &Record) -> Vec<u8> {
        (self.f)(record)
    }
}

/// Serialize `value` to a compact JSON string, empty on failure.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Text used in place of a pair whose key is not a string.
pub(crate) fn non_string_key(key: &Value) -> String {
    format!("{} is not a string key", key.describe())
}

/// Logfmt rendering of a single value.
pub(crate) fn logfmt_value(value: &Value) -> String {
    match value.coerce() {
        Value::Nil => "nil".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Uint(u) => u.to_string(),
        Value::Float(f) => format!("{:.3}", f),
        Value::Str(s) => escape(&s).into_owned(),
        Value::Time(t) => escape(&TimestampFormat::DateTime.format(&t)).into_owned(),
        other => escape(&other.describe()).into_owned(),
    }
}

/// Escape a logfmt string.
///
/// Backslash, quote, `\n`, `\r` and `\t` are escaped. The result is wrapped
/// in quotes only when the string contains a space, `=`, `"` or another
/// control character, so `a\tb` stays unquoted.
pub(crate) fn escape(s: &str) -> Cow<'_, str> {
    let mut needs_quotes = false;
    let mut needs_escape = false;
    for c in s.chars() {
        match c {
            '\\' | '\n' | '\r' | '\t' => needs_escape = true,
            '"' => {
                needs_escape = true;
                needs_quotes = true;
            }
            ' ' | '=' => needs_quotes = true,
            c if c.is_control() => needs_quotes = true,
            _ => {}
        }
    }
    if !needs_escape && !needs_quotes {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 2);
    if needs_quotes {
        out.push('"');
    }
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    if needs_quotes {
        out.push('"');
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_is_borrowed() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_escape_quotes_and_newline() {
        assert_eq!(escape("he said \"hi\"\n"), "\"he said \\\"hi\\\"\\n\"");
    }

    #[test]
    fn test_escape_without_quotes() {
        assert_eq!(escape("a\tb"), "a\\tb");
        assert_eq!(escape("C:\\tmp"), "C:\\\\tmp");
    }

    #[test]
    fn test_quote_without_escape() {
        assert_eq!(escape("a b"), "\"a b\"");
        assert_eq!(escape("k=v"), "\"k=v\"");
        assert_eq!(escape("bell\u{7}"), "\"bell\u{7}\"");
    }

    #[test]
    fn test_logfmt_value_rendering() {
        assert_eq!(logfmt_value(&Value::Nil), "nil");
        assert_eq!(logfmt_value(&Value::from(true)), "true");
        assert_eq!(logfmt_value(&Value::from(3.14159)), "3.142");
        assert_eq!(logfmt_value(&Value::from(-7)), "-7");
        assert_eq!(logfmt_value(&Value::from("two words")), "\"two words\"");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "bad fd");
        assert_eq!(logfmt_value(&Value::error(io)), "\"bad fd\"");
    }

    #[test]
    fn test_to_json_string() {
        assert_eq!(to_json_string(&vec![1, 2]), "[1,2]");
        assert_eq!(to_json_string("x"), "\"x\"");
    }
}
