//! Error types for the archive index

use std::io;
use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for index operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Archive file or internal path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Index file is malformed
    #[error("Invalid index format: {0}")]
    InvalidFormat(String),

    /// Patch payload is not a readable zip container
    #[error("Invalid patch payload: {0}")]
    Payload(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl Error {
    /// Create a new InvalidFormat error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Error::InvalidFormat(msg.into())
    }

    /// Create a new NotFound error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Error::NotFound(what.into())
    }

    /// Check if this error indicates a corrupted index or payload
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::InvalidFormat(_) | Error::Payload(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Payload(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::not_found("art/icon.png");
        assert_eq!(err.to_string(), "Not found: art/icon.png");

        let err = Error::invalid_format("bad magic");
        assert_eq!(err.to_string(), "Invalid index format: bad magic");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::invalid_format("x").is_corruption());
        assert!(Error::Payload("x".into()).is_corruption());
        assert!(!Error::not_found("x").is_corruption());
    }

    #[test]
    fn test_zip_io_error_maps_to_io() {
        let err: Error = zip::result::ZipError::Io(io::Error::other("disk")).into();
        assert!(matches!(err, Error::Io(_)));

        let err: Error = zip::result::ZipError::InvalidArchive("bad".into()).into();
        assert!(matches!(err, Error::Payload(_)));
    }
}
