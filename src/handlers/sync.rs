//! Serializing decorator

use crate::core::{Handler, Record, Result};
use parking_lot::Mutex;

/// Serialize calls into a handler that is not safe to enter concurrently
///
/// Only one `log` or `flush` runs on the wrapped handler at a time.
pub struct SyncHandler<H> {
    lock: Mutex<()>,
    inner: H,
}

impl<H: Handler> SyncHandler<H> {
    pub fn new(inner: H) -> Self {
        Self {
            lock: Mutex::new(()),
            inner,
        }
    }
}

impl<H: Handler> Handler for SyncHandler<H> {
    fn log(&self, record: &Record) -> Result<()> {
        let _guard = self.lock.lock();
        self.inner.log(record)
    }

    fn flush(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.inner.flush()
    }
}
