//! Log level definitions
//!
//! Levels are ordered most severe first: `Fatal` has the smallest ordinal and
//! `Trace` the largest. A record passes a threshold when
//! `record.level <= threshold`, so a threshold of `Trace` shows everything.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[repr(u8)]
pub enum Level {
    Fatal = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    #[default]
    Trace = 5,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }

    /// Upper-case name used by the terminal layout.
    pub fn as_upper_str(&self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    /// Level for a raw ordinal, `None` when out of range.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    #[inline]
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Whether a record at this level passes `threshold`.
    #[inline]
    pub fn passes(&self, threshold: Level) -> bool {
        *self <= threshold
    }

    pub fn color(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Fatal => Magenta,
            Level::Error => Red,
            Level::Warn => Yellow,
            Level::Info => Green,
            Level::Debug => Cyan,
            Level::Trace => Black,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" | "dbug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" | "eror" => Ok(Level::Error),
            "crit" | "fatal" => Ok(Level::Fatal),
            _ => Err(LoggerError::UnknownLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, <Level as TryFrom<String>>::Error> {
        s.parse()
    }
}
