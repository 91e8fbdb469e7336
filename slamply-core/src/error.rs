//! Error types for slamply

use thiserror::Error;

/// Main error type for slamply operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A delimited input table could not be parsed. `line` is 1-based.
    #[error("Input format error at line {line}: {message}")]
    InputFormat { line: usize, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    pub fn input_format(line: usize, message: impl Into<String>) -> Self {
        Error::InputFormat {
            line,
            message: message.into(),
        }
    }

    /// Whether this error came from malformed input rather than the filesystem
    pub fn is_input_format(&self) -> bool {
        matches!(self, Error::InputFormat { .. })
    }
}

/// Result type alias for slamply operations
pub type Result<T> = std::result::Result<T, Error>;
