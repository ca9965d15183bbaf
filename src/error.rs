//! Error types for the shared drive.

use thiserror::Error;

use crate::file::Root;

/// Common error type for drive operations.
#[derive(Error, Debug)]
pub enum DriveError {
    /// The request body could not be decoded (no boundary, no parts).
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// One root received the file, the other did not.
    ///
    /// At least one durable copy exists under `written`.
    #[error("partial write of {name}: stored in {written}, failed in {failed}: {source}")]
    PartialWrite {
        name: String,
        written: Root,
        failed: Root,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for drive operations.
pub type Result<T> = std::result::Result<T, DriveError>;
