//! Declarative logger configuration
//!
//! A [`LoggerConfig`] describes a complete handler chain (format, output,
//! rotation, buffering and call-site annotation) and builds a ready
//! [`Logger`] from it. It deserializes from JSON:
//!
//! ```
//! use kvlog::config::LoggerConfig;
//!
//! let config = LoggerConfig::from_json(r#"{
//!     "level": "info",
//!     "format": "json",
//!     "output": "stderr",
//!     "buffer": 1024,
//!     "fields": { "service": "billing" }
//! }"#).unwrap();
//!
//! let logger = config.build().unwrap();
//! assert!(!logger.is_debug_enabled());
//! ```

use crate::core::{
    CallFormat, HandlerRef, KeyNames, Level, Logger, LoggerError, Result, TimestampFormat, Value,
};
use crate::format::{Format, JsonFormat, LogfmtFormat, TerminalFormat};
use crate::handlers::{
    file_handler, rotating_file_handler, BufferedHandler, CallerFileHandler, CallerFuncHandler,
    CallerStackHandler, RotateOptions, StreamHandler,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Terminal,
    #[default]
    Logfmt,
    Json,
}

/// Where formatted records go: `"stdout"`, `"stderr"` or `{"file": "path"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerMode {
    /// `caller=<file:line>`
    File,
    /// `fn=<function>`
    Func,
    /// `stack=[...]`
    Stack,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: Level,
    pub format: FormatKind,
    pub output: Output,
    /// Only valid with a file output
    pub rotate: Option<RotateOptions>,
    /// Indented JSON
    pub pretty: bool,
    /// ANSI colors for the terminal format, on when unset
    pub colors: Option<bool>,
    pub timestamp: Option<TimestampFormat>,
    /// Queue capacity of a background writer; written inline when unset
    pub buffer: Option<usize>,
    pub caller: Option<CallerMode>,
    pub key_names: KeyNames,
    /// Context pairs attached to every record
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LoggerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading configuration",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rotate.is_some() && !matches!(self.output, Output::File(_)) {
            return Err(LoggerError::config(
                "LoggerConfig",
                "rotate requires a file output",
            ));
        }
        if self.pretty && self.format != FormatKind::Json {
            return Err(LoggerError::config(
                "LoggerConfig",
                "pretty is only supported by the json format",
            ));
        }
        if let Some(ts) = &self.timestamp {
            ts.validate()?;
        }
        Ok(())
    }

    fn formatter(&self) -> Box<dyn Format> {
        match self.format {
            FormatKind::Terminal => {
                let mut format = TerminalFormat::new().with_colors(self.colors.unwrap_or(true));
                if let Some(ts) = &self.timestamp {
                    format = format.with_timestamp_format(ts.clone());
                }
                Box::new(format)
            }
            FormatKind::Logfmt => {
                let mut format = LogfmtFormat::new();
                if let Some(ts) = &self.timestamp {
                    format = format.with_timestamp_format(ts.clone());
                }
                Box::new(format)
            }
            FormatKind::Json => {
                let mut format = JsonFormat::new().pretty(self.pretty);
                if let Some(ts) = &self.timestamp {
                    format = format.with_timestamp_format(ts.clone());
                }
                Box::new(format)
            }
        }
    }

    fn sink(&self) -> Result<HandlerRef> {
        let format = self.formatter();
        let handler: HandlerRef = match (&self.output, &self.rotate) {
            (Output::Stdout, _) => Arc::new(StreamHandler::new(io::stdout(), format)),
            (Output::Stderr, _) => Arc::new(StreamHandler::new(io::stderr(), format)),
            (Output::File(path), None) => Arc::new(file_handler(path, format)?),
            (Output::File(path), Some(options)) => {
                Arc::new(rotating_file_handler(path, options.clone(), format)?)
            }
        };
        Ok(handler)
    }

    /// Assemble the handler chain and the logger.
    ///
    /// Call-site annotation wraps the background writer so that stacks are
    /// captured on the emitting thread.
    pub fn build(&self) -> Result<Logger> {
        self.validate()?;

        let mut handler = self.sink()?;
        if let Some(capacity) = self.buffer {
            handler = Arc::new(BufferedHandler::new(capacity, handler));
        }
        handler = match self.caller {
            Some(CallerMode::File) => Arc::new(CallerFileHandler::new(handler)),
            Some(CallerMode::Func) => Arc::new(CallerFuncHandler::new(handler)),
            Some(CallerMode::Stack) => Arc::new(CallerStackHandler::new(CallFormat::Short, handler)),
            None => handler,
        };

        let fields: Vec<Value> = self
            .fields
            .iter()
            .flat_map(|(k, v)| [Value::from(k.as_str()), json_to_value(v)])
            .collect();

        Ok(Logger::builder()
            .level(self.level)
            .handler(handler)
            .key_names(self.key_names.clone())
            .fields(fields)
            .build())
    }
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::Uint(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        other => Value::Str(other.to_string()),
    }
}
