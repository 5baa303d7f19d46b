//! Call-site annotating decorators
//!
//! Each handler clones the record, appends one pair describing where the
//! record was emitted and delegates. The function and stack variants walk
//! the current thread's stack, so they only see the call site when they run
//! on the emitting thread (not behind a [`BufferedHandler`](super::BufferedHandler));
//! otherwise they fall back to the captured `file:line`.

use crate::core::{CallFormat, CallStack, Handler, Record, Result};

/// Append `caller=<file:line>`
pub struct CallerFileHandler<H> {
    inner: H,
}

impl<H: Handler> CallerFileHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: Handler> Handler for CallerFileHandler<H> {
    fn log(&self, record: &Record) -> Result<()> {
        let mut annotated = record.clone();
        annotated.push("caller", record.call.to_string());
        self.inner.log(&annotated)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

/// Append `fn=<function path>` of the emitting function
pub struct CallerFuncHandler<H> {
    inner: H,
}

impl<H: Handler> CallerFuncHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: Handler> Handler for CallerFuncHandler<H> {
    fn log(&self, record: &Record) -> Result<()> {
        let stack = CallStack::capture();
        let function = match stack.find(&record.call) {
            Some(frame) => frame.function.clone(),
            None => record.call.to_string(),
        };

        let mut annotated = record.clone();
        annotated.push("fn", function);
        self.inner.log(&annotated)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

/// Append `stack=[a.rs:1 b.rs:2 ...]` starting at the call site
pub struct CallerStackHandler<H> {
    format: CallFormat,
    inner: H,
}

impl<H: Handler> CallerStackHandler<H> {
    pub fn new(format: CallFormat, inner: H) -> Self {
        Self { format, inner }
    }

    fn render(&self, record: &Record) -> String {
        let stack = CallStack::capture().trim_above(&record.call).trim_runtime();
        if !stack.is_empty() {
            return stack.render(self.format);
        }
        match self.format {
            CallFormat::Short => format!("[{}]", record.call),
            CallFormat::Long => format!("[{}]", record.call.long()),
        }
    }
}

impl<H: Handler> Handler for CallerStackHandler<H> {
    fn log(&self, record: &Record) -> Result<()> {
        let mut annotated = record.clone();
        annotated.push("stack", self.render(record));
        self.inner.log(&annotated)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}
