use std::time::Duration;

use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-level errors for DevDash. Any of these aborts the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Terminal/display error
    #[error("Display error: {message}")]
    Display { message: String },

    /// Invalid command-line input that clap could not reject on its own
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn display(message: impl Into<String>) -> Self {
        Self::Display {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Failure of a single data source query.
///
/// Collectors never return these to callers; they are logged and turned into the
/// documented sentinel value for the accessor.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("`{program}` is not installed")]
    NotFound { program: String },

    #[error("`{program}` did not finish within {}s", timeout.as_secs_f32())]
    Timeout { program: String, timeout: Duration },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: String },

    #[error("unsupported on this platform: {what}")]
    Unsupported { what: &'static str },

    #[error("permission denied: {what}")]
    PermissionDenied { what: String },

    #[error("could not parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectError {
    pub fn parse(what: &'static str, message: impl ToString) -> Self {
        Self::Parse {
            what,
            message: message.to_string(),
        }
    }
}
