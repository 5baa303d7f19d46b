//! Handler implementations
//!
//! Sinks write formatted records somewhere; decorators wrap another handler
//! and filter, annotate, fan out, serialize or queue records on the way.

mod buffered;
mod caller;
mod filter;
mod lazy;
mod multi;
mod rotating_file;
mod stream;
mod sync;

pub use buffered::BufferedHandler;
pub use caller::{CallerFileHandler, CallerFuncHandler, CallerStackHandler};
pub use filter::{FilterHandler, LevelFilterHandler, MatchFilterHandler};
pub use lazy::LazyHandler;
pub use multi::{FailoverHandler, MultiHandler};
pub use rotating_file::{RotateOptions, RotatingFileWriter};
pub use stream::{file_handler, rotating_file_handler, stderr_handler, stdout_handler, StreamHandler};
pub use sync::SyncHandler;

pub use crate::core::{DiscardHandler, FuncHandler, Handler, HandlerRef, SwapHandler};
