//! Error types for filerelay.

use thiserror::Error;

/// Common error type for filerelay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// I/O error.
    ///
    /// Disk full, permission denied and similar faults end up here and are
    /// reported as a generic server fault.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upload request did not carry a `file` part.
    #[error("no file attached")]
    MissingFile,

    /// The retrieval request did not name a file.
    #[error("no filename given")]
    MissingFilename,

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for filerelay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
