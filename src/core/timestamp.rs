//! Timestamp formatting utilities
//!
//! Each formatter renders the record time through a `TimestampFormat`, so the
//! layout can be changed without touching the formatter itself.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Timestamp layouts understood by the built-in formatters
///
/// # Examples
///
/// ```
/// use kvlog::core::TimestampFormat;
/// use chrono::Local;
///
/// let format = TimestampFormat::Clock;
/// let rendered = format.format(&Local::now());
/// assert_eq!(rendered.len(), "10:30:45.123".len());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `2025-01-08 10:30:45.123`, the logfmt default
    #[default]
    DateTime,

    /// `10:30:45.123`, the terminal default
    Clock,

    /// `2025-01-08T10:30:45.123+01:00`, the JSON default
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Any strftime-compatible pattern
    ///
    /// A pattern chrono cannot render falls back to the `DateTime` layout.
    ///
    /// ```
    /// use kvlog::core::TimestampFormat;
    ///
    /// // Apache log format
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::DateTime => datetime.format(DATE_TIME_PATTERN).to_string(),
            TimestampFormat::Clock => datetime.format("%H:%M:%S%.3f").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => {
                let mut out = String::with_capacity(32);
                match write!(out, "{}", datetime.format(pattern)) {
                    Ok(()) => out,
                    Err(_) => datetime.format(DATE_TIME_PATTERN).to_string(),
                }
            }
        }
    }

    /// Reject custom patterns chrono cannot render.
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(pattern) = self {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "TimestampFormat",
                    format!("invalid strftime pattern '{}'", pattern),
                ));
            }
        }
        Ok(())
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn fixed_datetime() -> DateTime<Local> {
        // 2025-01-08 10:30:45.123456 UTC
        let utc = Utc
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456);
        utc.with_timezone(&Local)
    }

    #[test]
    fn test_datetime_format() {
        let dt = fixed_datetime();
        let result = TimestampFormat::DateTime.format(&dt);
        assert_eq!(result, dt.format("%Y-%m-%d %H:%M:%S").to_string() + ".123");
    }

    #[test]
    fn test_clock_format() {
        let result = TimestampFormat::Clock.format(&fixed_datetime());
        assert!(result.ends_with(":45.123"));
        assert_eq!(result.len(), 12);
    }

    #[test]
    fn test_rfc3339_parses_back() {
        let dt = fixed_datetime();
        let result = TimestampFormat::Rfc3339.format(&dt);
        let parsed = DateTime::<FixedOffset>::parse_from_rfc3339(&result).expect("rfc3339");
        assert_eq!(parsed.timestamp_micros(), dt.timestamp_micros());
    }

    #[test]
    fn test_unix_formats() {
        let dt = fixed_datetime();
        assert_eq!(TimestampFormat::Unix.format(&dt), "1736332245");
        assert_eq!(TimestampFormat::UnixMillis.format(&dt), "1736332245123");
    }

    #[test]
    fn test_custom_format() {
        let dt = fixed_datetime();
        let format = TimestampFormat::Custom("%Y/%m/%d".to_string());
        assert_eq!(format.format(&dt), dt.format("%Y/%m/%d").to_string());
    }

    #[test]
    fn test_invalid_custom_pattern_falls_back() {
        let dt = fixed_datetime();
        let format = TimestampFormat::Custom("%Q".to_string());
        assert_eq!(format.format(&dt), TimestampFormat::DateTime.format(&dt));
        assert!(matches!(
            format.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(TimestampFormat::Custom("%Y/%m/%d".to_string()).validate().is_ok());
        assert!(TimestampFormat::Clock.validate().is_ok());
    }

    #[test]
    fn test_is_numeric() {
        assert!(!TimestampFormat::DateTime.is_numeric());
        assert!(!TimestampFormat::Rfc3339.is_numeric());
        assert!(TimestampFormat::Unix.is_numeric());
        assert!(TimestampFormat::UnixMillis.is_numeric());
        assert!(!TimestampFormat::Custom("%Y".to_string()).is_numeric());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&TimestampFormat::UnixMillis).expect("serialize");
        assert_eq!(json, "\"unix_millis\"");

        let format: TimestampFormat =
            serde_json::from_str(r#"{"custom":"%Y-%m-%d"}"#).expect("deserialize custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
