use super::{escape, logfmt_value, non_string_key, Format};
use crate::core::{Record, TimestampFormat, ERROR_KEY};
use std::fmt::Write as _;

const RESET: &str = "\x1b[0m";

/// Human-oriented layout for interactive terminals
///
/// With colors, the level token and every key are wrapped in the level's
/// ANSI color:
///
/// ```text
/// INFO [10:30:45.123][server.rs:42] msg=served status=200
/// ```
///
/// Without colors the level is bracketed: `[INFO][10:30:45.123][server.rs:42] msg=served status=200`.
#[derive(Debug, Clone)]
pub struct TerminalFormat {
    colors: bool,
    timestamp_format: TimestampFormat,
}

impl TerminalFormat {
    pub fn new() -> Self {
        Self {
            colors: true,
            timestamp_format: TimestampFormat::Clock,
        }
    }

    /// Same layout without ANSI escape codes.
    pub fn plain() -> Self {
        Self::new().with_colors(false)
    }

    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Default for TerminalFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl Format for TerminalFormat {
    fn format(&self, record: &Record) -> Vec<u8> {
        let names = &record.key_names;
        let level = record.level.as_upper_str();
        let clock = self.timestamp_format.format(&record.time);
        let caller = record.caller_string();
        let color = record.level.color().to_fg_str();

        let mut buf = String::with_capacity(128);
        if self.colors {
            let _ = write!(buf, "\x1b[{}m{}{} [{}][{}]", color, level, RESET, clock, caller);
        } else {
            let _ = write!(buf, "[{}][{}][{}]", level, clock, caller);
        }
        let _ = write!(buf, " {}={}", names.msg, escape(&record.msg));

        let mut pairs: Vec<(&str, String)> = Vec::with_capacity(record.kv.len() / 2 + 1);
        if let Some(id) = record.request_id() {
            pairs.push((names.request_id.as_str(), escape(id).into_owned()));
        }
        for (key, value) in record.pairs() {
            match key.as_str() {
                Some(k) => pairs.push((k, logfmt_value(value))),
                None => pairs.push((ERROR_KEY, escape(&non_string_key(key)).into_owned())),
            }
        }

        for (key, value) in pairs {
            if self.colors {
                let _ = write!(buf, " \x1b[{}m{}{}={}", color, key, RESET, value);
            } else {
                let _ = write!(buf, " {}={}", key, value);
            }
        }
        buf.push('\n');
        buf.into_bytes()
    }
}
