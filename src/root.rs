//! Process-wide root logger
//!
//! The root logger is created on first use with [`stdout_handler`] and a
//! `Trace` threshold. The free functions here forward to it, so the
//! recorded caller is the call site of the free function.
//!
//! ```
//! use kvlog::{kv, root};
//!
//! root::info("service started", kv!["port", 8080]);
//!
//! let db = root::new(kv!["component", "db"]);
//! db.debug("pool ready", kv!["size", 4]);
//! ```

use crate::core::{Level, Logger, RequestContext, Value};
use crate::handlers::stdout_handler;
use once_cell::sync::Lazy;

static ROOT: Lazy<Logger> = Lazy::new(|| {
    Logger::builder()
        .level(Level::Trace)
        .handler(stdout_handler())
        .build()
});

/// The process-wide root logger.
pub fn root() -> &'static Logger {
    &ROOT
}

/// A child of the root logger with `fields` as its context.
pub fn new<I>(fields: I) -> Logger
where
    I: IntoIterator<Item = Value>,
{
    ROOT.child(fields)
}

pub fn set_out_level(level: Level) {
    ROOT.set_out_level(level);
}

pub fn out_level() -> Level {
    ROOT.out_level()
}

pub fn is_trace_enabled() -> bool {
    ROOT.is_trace_enabled()
}

pub fn is_debug_enabled() -> bool {
    ROOT.is_debug_enabled()
}

pub fn is_info_enabled() -> bool {
    ROOT.is_info_enabled()
}

pub fn is_warn_enabled() -> bool {
    ROOT.is_warn_enabled()
}

pub fn is_error_enabled() -> bool {
    ROOT.is_error_enabled()
}

pub fn is_fatal_enabled() -> bool {
    ROOT.is_fatal_enabled()
}

macro_rules! root_emitters {
    ($(($name:ident, $ctx_name:ident)),+ $(,)?) => {
        $(
            #[track_caller]
            pub fn $name<I>(msg: impl Into<String>, fields: I)
            where
                I: IntoIterator<Item = Value>,
            {
                ROOT.$name(msg, fields)
            }

            #[track_caller]
            pub fn $ctx_name<I>(ctx: &RequestContext, msg: impl Into<String>, fields: I)
            where
                I: IntoIterator<Item = Value>,
            {
                ROOT.$ctx_name(ctx, msg, fields)
            }
        )+
    };
}

root_emitters!(
    (log, log_ctx),
    (trace, trace_ctx),
    (debug, debug_ctx),
    (info, info_ctx),
    (warn, warn_ctx),
    (error, error_ctx),
    (fatal, fatal_ctx),
);
