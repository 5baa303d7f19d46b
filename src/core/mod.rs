//! Core logger types and traits

pub mod caller;
pub mod error;
pub mod handler;
pub mod level;
pub mod logger;
pub mod record;
pub mod timestamp;
pub mod value;

pub use caller::{CallFormat, CallStack, Caller, Frame};
pub use error::{LoggerError, Result};
pub use handler::{DiscardHandler, FuncHandler, Handler, HandlerRef, SwapHandler};
pub use level::Level;
pub use logger::{ExitHook, Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use record::{merge_fields, normalize, KeyNames, Record, RequestContext, ERROR_KEY};
pub use timestamp::TimestampFormat;
pub use value::{Lazy, Resolve, Value};
