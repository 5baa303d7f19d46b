//! Fan-out and failover combinators

use crate::core::{Handler, HandlerRef, Record, Result};

/// Send every record to each handler in order
///
/// All handlers are attempted even when an earlier one fails; the first
/// error is returned.
pub struct MultiHandler {
    handlers: Vec<HandlerRef>,
}

impl MultiHandler {
    pub fn new(handlers: Vec<HandlerRef>) -> Self {
        Self { handlers }
    }
}

impl Handler for MultiHandler {
    fn log(&self, record: &Record) -> Result<()> {
        let mut first_err = None;
        for handler in &self.handlers {
            if let Err(e) = handler.log(record) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn flush(&self) -> Result<()> {
        let mut first_err = None;
        for handler in &self.handlers {
            if let Err(e) = handler.flush() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Try each handler in turn until one succeeds
///
/// Every failed attempt appends `failover_err_<i>` and the error text to
/// the record seen by the following handlers. When all handlers fail, the
/// last error is returned.
///
/// ```
/// use kvlog::prelude::*;
/// use std::sync::Arc;
///
/// let primary: HandlerRef = Arc::new(StreamHandler::new(std::io::sink(), JsonFormat::new()));
/// let handler = FailoverHandler::new(vec![primary, stderr_handler()]);
/// ```
pub struct FailoverHandler {
    handlers: Vec<HandlerRef>,
}

impl FailoverHandler {
    pub fn new(handlers: Vec<HandlerRef>) -> Self {
        Self { handlers }
    }
}

impl Handler for FailoverHandler {
    fn log(&self, record: &Record) -> Result<()> {
        let mut current: Option<Record> = None;
        let mut last_err = None;

        for (i, handler) in self.handlers.iter().enumerate() {
            let attempt = current.as_ref().unwrap_or(record);
            match handler.log(attempt) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    current
                        .get_or_insert_with(|| record.clone())
                        .push(format!("failover_err_{}", i), e.to_string());
                    last_err = Some(e);
                }
            }
        }

        last_err.map_or(Ok(()), Err)
    }

    fn flush(&self) -> Result<()> {
        let mut first_err = None;
        for handler in &self.handlers {
            if let Err(e) = handler.flush() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
