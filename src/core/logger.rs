//! Main logger implementation

use super::{
    error::Result,
    handler::{DiscardHandler, Handler, HandlerRef, SwapHandler},
    level::Level,
    record::{merge_fields, KeyNames, Record, RequestContext},
    value::Value,
};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default shutdown timeout for background workers (5 seconds)
///
/// Used when a buffered handler is dropped without an explicit `close`.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Called after a fatal record has been handled
pub type ExitHook = Arc<dyn Fn() + Send + Sync>;

/// A node in the logger tree
///
/// A logger carries an inherited key/value context, its own output
/// threshold and a swappable handler. Children created with
/// [`Logger::child`] copy all three at creation time; later changes on
/// either side do not propagate.
///
/// # Example
///
/// ```
/// use kvlog::prelude::*;
///
/// let logger = Logger::new();
/// let db = logger.child(kv!["component", "db"]);
/// db.info("connected", kv!["pool", 8]);
/// ```
pub struct Logger {
    context: Arc<[Value]>,
    handler: Arc<SwapHandler>,
    level: AtomicU8,
    key_names: KeyNames,
    exit_hook: ExitHook,
}

impl Logger {
    /// Empty context, `Trace` threshold, discarding handler.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// A child logger with `fields` appended to this logger's context.
    ///
    /// The child starts at this logger's current threshold, not at the
    /// `Trace` default of a fresh logger; change it with
    /// [`Logger::set_out_level`].
    #[must_use]
    pub fn child<I>(&self, fields: I) -> Logger
    where
        I: IntoIterator<Item = Value>,
    {
        Logger {
            context: merge_fields(&self.context, fields.into_iter().collect()).into(),
            handler: Arc::new(SwapHandler::new(self.handler.get())),
            level: AtomicU8::new(self.level.load(Ordering::Relaxed)),
            key_names: self.key_names.clone(),
            exit_hook: Arc::clone(&self.exit_hook),
        }
    }

    pub fn context(&self) -> &[Value] {
        &self.context
    }

    pub fn handler(&self) -> HandlerRef {
        self.handler.get()
    }

    pub fn set_handler(&self, handler: HandlerRef) {
        self.handler.swap(handler);
    }

    pub fn set_out_level(&self, level: Level) {
        self.level.store(level.ordinal(), Ordering::Relaxed);
    }

    /// Set the threshold from a raw ordinal; out-of-range values are ignored.
    pub fn set_out_level_raw(&self, ordinal: u8) {
        if let Some(level) = Level::from_ordinal(ordinal) {
            self.set_out_level(level);
        }
    }

    pub fn out_level(&self) -> Level {
        Level::from_ordinal(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.out_level())
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.enabled(Level::Trace)
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.enabled(Level::Debug)
    }

    pub fn is_info_enabled(&self) -> bool {
        self.enabled(Level::Info)
    }

    pub fn is_warn_enabled(&self) -> bool {
        self.enabled(Level::Warn)
    }

    pub fn is_error_enabled(&self) -> bool {
        self.enabled(Level::Error)
    }

    pub fn is_fatal_enabled(&self) -> bool {
        self.enabled(Level::Fatal)
    }

    /// Flush the current handler.
    pub fn flush(&self) -> Result<()> {
        self.handler.flush()
    }

    #[track_caller]
    fn write<M, I>(&self, level: Level, msg: M, fields: I, ctx: Option<&RequestContext>)
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        if self.enabled(level) {
            let mut record = Record::new(level, msg.into(), Vec::new())
                .with_key_names(self.key_names.clone());
            record.kv = merge_fields(&self.context, fields.into_iter().collect());
            if let Some(ctx) = ctx {
                record = record.with_context(ctx.clone());
            }
            if let Err(e) = self.handler.log(&record) {
                eprintln!("[LOGGER ERROR] handler failed: {}", e);
            }
        }

        if level == Level::Fatal {
            if let Err(e) = self.handler.flush() {
                eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
            }
            (self.exit_hook)();
        }
    }

    /// Emit at an explicit level; the entry point used by the logging macros.
    #[track_caller]
    pub fn log_at<I>(&self, level: Level, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(level, msg, fields, None);
    }

    /// Emit at an explicit level with a request context.
    #[track_caller]
    pub fn log_at_ctx<I>(&self, ctx: &RequestContext, level: Level, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(level, msg, fields, Some(ctx));
    }

    /// Emit at `Trace`.
    #[track_caller]
    pub fn log<I>(&self, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Trace, msg, fields, None);
    }

    #[track_caller]
    pub fn trace<I>(&self, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Trace, msg, fields, None);
    }

    #[track_caller]
    pub fn debug<I>(&self, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Debug, msg, fields, None);
    }

    #[track_caller]
    pub fn info<I>(&self, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Info, msg, fields, None);
    }

    #[track_caller]
    pub fn warn<I>(&self, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Warn, msg, fields, None);
    }

    #[track_caller]
    pub fn error<I>(&self, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Error, msg, fields, None);
    }

    /// Emit at `Fatal`, flush, then run the exit hook (process exit by default).
    #[track_caller]
    pub fn fatal<I>(&self, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Fatal, msg, fields, None);
    }

    #[track_caller]
    pub fn log_ctx<I>(&self, ctx: &RequestContext, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Trace, msg, fields, Some(ctx));
    }

    #[track_caller]
    pub fn trace_ctx<I>(&self, ctx: &RequestContext, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Trace, msg, fields, Some(ctx));
    }

    #[track_caller]
    pub fn debug_ctx<I>(&self, ctx: &RequestContext, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Debug, msg, fields, Some(ctx));
    }

    #[track_caller]
    pub fn info_ctx<I>(&self, ctx: &RequestContext, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Info, msg, fields, Some(ctx));
    }

    #[track_caller]
    pub fn warn_ctx<I>(&self, ctx: &RequestContext, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Warn, msg, fields, Some(ctx));
    }

    #[track_caller]
    pub fn error_ctx<I>(&self, ctx: &RequestContext, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Error, msg, fields, Some(ctx));
    }

    #[track_caller]
    pub fn fatal_ctx<I>(&self, ctx: &RequestContext, msg: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.write(Level::Fatal, msg, fields, Some(ctx));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .field("level", &self.out_level())
            .field("key_names", &self.key_names)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use kvlog::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .level(Level::Debug)
///     .handler(Arc::new(StreamHandler::new(std::io::sink(), LogfmtFormat::new())))
///     .fields(kv!["service", "api"])
///     .build();
/// assert!(logger.is_debug_enabled());
/// ```
pub struct LoggerBuilder {
    level: Level,
    handler: HandlerRef,
    fields: Vec<Value>,
    key_names: KeyNames,
    exit_hook: ExitHook,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            level: Level::Trace,
            handler: Arc::new(DiscardHandler),
            fields: Vec::new(),
            key_names: KeyNames::default(),
            exit_hook: Arc::new(|| {
                std::process::exit(1);
            }),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn handler(mut self, handler: HandlerRef) -> Self {
        self.handler = handler;
        self
    }

    /// Context pairs attached to every record.
    #[must_use = "builder methods return a new value"]
    pub fn fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.fields.extend(fields);
        self
    }

    /// Rename the built-in record fields.
    #[must_use = "builder methods return a new value"]
    pub fn key_names(mut self, key_names: KeyNames) -> Self {
        self.key_names = key_names;
        self
    }

    /// Replace the action taken after a fatal record.
    ///
    /// The default exits the process with status 1.
    #[must_use = "builder methods return a new value"]
    pub fn exit_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.exit_hook = Arc::new(hook);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            context: merge_fields(&[], self.fields).into(),
            handler: Arc::new(SwapHandler::new(self.handler)),
            level: AtomicU8::new(self.level.ordinal()),
            key_names: self.key_names,
            exit_hook: self.exit_hook,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
