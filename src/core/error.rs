//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Error returned by the underlying writer, text kept as-is
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text that does not name a level
    #[error("unknown level: '{0}'")]
    UnknownLevel(String),

    /// A lazy value could not be resolved
    #[error("{0}")]
    Lazy(String),

    /// Buffered handler already shut down
    #[error("buffered handler is closed")]
    HandlerClosed,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotation { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    Writer(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn lazy<S: Into<String>>(msg: S) -> Self {
        LoggerError::Lazy(msg.into())
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::Writer(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LoggerConfig", "unknown format");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert!(matches!(err, LoggerError::FileRotation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::UnknownLevel("loud".to_string());
        assert_eq!(err.to_string(), "unknown level: 'loud'");

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::config("LoggerConfig", "unknown format");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LoggerConfig: unknown format"
        );
    }

    #[test]
    fn test_io_error_keeps_writer_text() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed pipe");
        let err = LoggerError::from(io_err);
        assert_eq!(err.to_string(), "closed pipe");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("compressing backup", "cannot open file", io_err);

        assert!(err.to_string().contains("compressing backup"));
        assert!(err.to_string().contains("cannot open file"));
    }
}
