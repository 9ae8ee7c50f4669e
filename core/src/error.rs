//! Error types

use thiserror::Error;

/// Errors raised while loading inputs, validating the scene and writing
/// outputs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Shape model error: {0}")]
    Model(String),

    #[error("Worker {worker} failed: {message}")]
    Worker { worker: usize, message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Returns a parse error.
    ///
    /// * `path`    - File being parsed.
    /// * `line`    - 1-based line number.
    /// * `message` - What went wrong.
    pub fn parse<P: AsRef<std::path::Path>>(path: P, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.as_ref().display().to_string(),
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;
