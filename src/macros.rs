//! Logging macros for ergonomic key/value lists and formatted messages.
//!
//! # Examples
//!
//! ```
//! use kvlog::prelude::*;
//! use kvlog::{info, kv};
//!
//! let logger = Logger::new();
//!
//! // Key/value pairs of mixed types
//! logger.info("request served", kv!["path", "/health", "status", 200, "ok", true]);
//!
//! // Formatted message, optional pairs after `;`
//! let port = 8080;
//! info!(logger, "listening on port {}", port);
//! info!(logger, "listening on port {}", port; "tls", false);
//! ```

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```
/// use kvlog::{kv, Value};
///
/// let fields = kv!["user", "alice", "attempts", 3];
/// assert_eq!(fields[3], Value::Int(3));
/// ```
#[macro_export]
macro_rules! kv {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

/// Emit a formatted message at the given level.
///
/// ```
/// # use kvlog::prelude::*;
/// # let logger = Logger::new();
/// use kvlog::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500; "retry", false);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($kv:expr),+ $(,)?) => {
        $logger.log_at($level, ::std::format!($fmt $(, $arg)*), $crate::kv![$($kv),+])
    };
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $logger.log_at($level, ::std::format!($fmt $(, $arg)*), $crate::kv![])
    };
}

/// Log a trace-level message.
///
/// ```
/// # use kvlog::prelude::*;
/// # let logger = Logger::new();
/// use kvlog::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// ```
/// # use kvlog::prelude::*;
/// # let logger = Logger::new();
/// use kvlog::info;
/// info!(logger, "Application started");
/// info!(logger, "Server listening on {}:{}", "localhost", 8080; "tls", true);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a warn-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{FuncHandler, Level, Logger, Record};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn capturing_logger() -> (Logger, Arc<Mutex<Vec<Record>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&records);
        let logger = Logger::new();
        logger.set_handler(Arc::new(FuncHandler::new(move |r: &Record| {
            sink.lock().push(r.clone());
            Ok(())
        })));
        (logger, records)
    }

    #[test]
    fn test_kv_macro_types() {
        let fields = kv!["a", 1u8, "b", 2.5, "c", true];
        assert_eq!(fields.len(), 6);
        assert!(kv![].is_empty());
    }

    #[test]
    fn test_format_macros() {
        let (logger, records) = capturing_logger();
        info!(logger, "port {}", 8080);
        warn!(logger, "disk at {}%", 91; "mount", "/var");
        error!(logger, "plain");

        let records = records.lock();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].msg, "port 8080");
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[1].kv, kv!["mount", "/var"]);
        assert_eq!(records[2].level, Level::Error);
    }

    #[test]
    fn test_macro_respects_threshold() {
        let (logger, records) = capturing_logger();
        logger.set_out_level(Level::Info);
        debug!(logger, "hidden {}", 1);
        trace!(logger, "hidden");
        assert!(records.lock().is_empty());
    }
}
