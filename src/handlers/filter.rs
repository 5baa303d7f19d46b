//! Filtering decorators
//!
//! A filtered-out record is dropped silently; `log` still returns `Ok`.

use crate::core::{Handler, Level, Record, Result, Value};

/// Forward only records for which the predicate holds
pub struct FilterHandler<F, H> {
    predicate: F,
    inner: H,
}

impl<F, H> FilterHandler<F, H>
where
    F: Fn(&Record) -> bool + Send + Sync,
    H: Handler,
{
    pub fn new(predicate: F, inner: H) -> Self {
        Self { predicate, inner }
    }
}

impl<F, H> Handler for FilterHandler<F, H>
where
    F: Fn(&Record) -> bool + Send + Sync,
    H: Handler,
{
    fn log(&self, record: &Record) -> Result<()> {
        if (self.predicate)(record) {
            self.inner.log(record)
        } else {
            Ok(())
        }
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

/// Drop records less severe than `max_level`
///
/// ```
/// use kvlog::prelude::*;
/// use std::sync::Arc;
///
/// // only warnings and worse reach stderr
/// let handler = LevelFilterHandler::new(Level::Warn, stderr_handler());
/// let logger = Logger::builder().handler(Arc::new(handler)).build();
/// ```
pub struct LevelFilterHandler<H> {
    max_level: Level,
    inner: H,
}

impl<H: Handler> LevelFilterHandler<H> {
    pub fn new(max_level: Level, inner: H) -> Self {
        Self { max_level, inner }
    }
}

impl<H: Handler> Handler for LevelFilterHandler<H> {
    fn log(&self, record: &Record) -> Result<()> {
        if record.level.passes(self.max_level) {
            self.inner.log(record)
        } else {
            Ok(())
        }
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

/// Forward only records where `key` equals `value`
///
/// The record's configured level, message and time key names address the
/// built-in fields; the level compares as its lower-case name. Any other key
/// is looked up among the pairs, where `Value::Nil` matches a pair that is
/// present with a nil value. A missing key never matches.
pub struct MatchFilterHandler<H> {
    key: String,
    value: Value,
    inner: H,
}

impl<H: Handler> MatchFilterHandler<H> {
    pub fn new(key: impl Into<String>, value: impl Into<Value>, inner: H) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            inner,
        }
    }

    fn matches(&self, record: &Record) -> bool {
        let names = &record.key_names;
        if self.key == names.level {
            self.value == Value::from(record.level)
        } else if self.key == names.msg {
            self.value.as_str() == Some(record.msg.as_str())
        } else if self.key == names.time {
            self.value == Value::Time(record.time)
        } else {
            record.get(&self.key).is_some_and(|v| *v == self.value)
        }
    }
}

impl<H: Handler> Handler for MatchFilterHandler<H> {
    fn log(&self, record: &Record) -> Result<()> {
        if self.matches(record) {
            self.inner.log(record)
        } else {
            Ok(())
        }
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}
