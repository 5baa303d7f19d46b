//! Stream handler and the ready-made stdout/stderr/file sinks

use super::rotating_file::{RotateOptions, RotatingFileWriter};
use crate::core::{Handler, HandlerRef, Record, Result};
use crate::format::{Format, LogfmtFormat, TerminalFormat};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

/// Formats each record and writes it to `W`
///
/// Writes are serialized by an internal lock and each record is written with
/// a single `write_all` followed by a flush, so lines from concurrent
/// producers never interleave. Write errors are returned unchanged.
pub struct StreamHandler<W: Write + Send> {
    writer: Mutex<W>,
    format: Box<dyn Format>,
}

impl<W: Write + Send> StreamHandler<W> {
    pub fn new<F: Format + 'static>(writer: W, format: F) -> Self {
        Self {
            writer: Mutex::new(writer),
            format: Box::new(format),
        }
    }

    /// Consume the handler, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Handler for StreamHandler<W> {
    fn log(&self, record: &Record) -> Result<()> {
        let bytes = self.format.format(record);
        let mut writer = self.writer.lock();
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

/// Terminal layout when `stdout` is a terminal, logfmt otherwise.
pub fn stdout_handler() -> HandlerRef {
    if io::stdout().is_terminal() {
        Arc::new(StreamHandler::new(io::stdout(), TerminalFormat::new()))
    } else {
        Arc::new(StreamHandler::new(io::stdout(), LogfmtFormat::new()))
    }
}

/// Terminal layout when `stderr` is a terminal, logfmt otherwise.
pub fn stderr_handler() -> HandlerRef {
    if io::stderr().is_terminal() {
        Arc::new(StreamHandler::new(io::stderr(), TerminalFormat::new()))
    } else {
        Arc::new(StreamHandler::new(io::stderr(), LogfmtFormat::new()))
    }
}

/// Append formatted records to the file at `path`, creating it if needed.
pub fn file_handler<P, F>(path: P, format: F) -> Result<StreamHandler<File>>
where
    P: AsRef<Path>,
    F: Format + 'static,
{
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(StreamHandler::new(file, format))
}

/// Write formatted records through a [`RotatingFileWriter`].
pub fn rotating_file_handler<P, F>(
    path: P,
    options: RotateOptions,
    format: F,
) -> Result<StreamHandler<RotatingFileWriter>>
where
    P: AsRef<Path>,
    F: Format + 'static,
{
    let writer = RotatingFileWriter::new(path, options)?;
    Ok(StreamHandler::new(writer, format))
}
