//! # kvlog
//!
//! Structured, leveled key/value logging.
//!
//! A [`Logger`] carries an inherited key/value context and hands every
//! record that passes its threshold to a [`Handler`](core::Handler).
//! Handlers compose: sinks format records as logfmt, JSON or colored
//! terminal lines and write them out; decorators filter, fan out, fail
//! over, buffer, serialize or annotate records on their way to a sink.
//!
//! ## Features
//!
//! - **Levels**: `fatal` through `trace`, with a per-logger atomic threshold
//! - **Context**: child loggers extend the parent's key/value pairs
//! - **Formats**: logfmt, JSON (flat or pretty) and ANSI terminal output
//! - **Handlers**: stream, file, rotating file, filter, multi, failover,
//!   buffered, caller annotation and lazy value resolution
//! - **Thread Safe**: every logger and handler can be shared across threads
//!
//! ## Example
//!
//! ```
//! use kvlog::prelude::*;
//! use std::sync::Arc;
//!
//! let logger = Logger::builder()
//!     .level(Level::Info)
//!     .handler(Arc::new(StreamHandler::new(std::io::stdout(), LogfmtFormat::new())))
//!     .build();
//!
//! let requests = logger.child(kv!["component", "http"]);
//! requests.info("request served", kv!["path", "/health", "status", 200]);
//! requests.debug("not shown", kv![]);
//! ```

pub mod config;
pub mod core;
pub mod format;
pub mod handlers;
pub mod macros;
pub mod root;

pub mod prelude {
    pub use crate::core::{
        CallFormat, DiscardHandler, FuncHandler, Handler, HandlerRef, Lazy, Level, Logger,
        LoggerBuilder, LoggerError, Record, RequestContext, SwapHandler, Value,
    };
    pub use crate::format::{Format, JsonFormat, LogfmtFormat, TerminalFormat};
    pub use crate::handlers::{
        stderr_handler, stdout_handler, BufferedHandler, FailoverHandler, LevelFilterHandler,
        MultiHandler, StreamHandler,
    };
    pub use crate::kv;
}

pub use config::LoggerConfig;
pub use core::{
    Handler, Lazy, Level, Logger, LoggerBuilder, LoggerError, Record, RequestContext, Result,
    Value, DEFAULT_SHUTDOWN_TIMEOUT,
};
