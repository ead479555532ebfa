//! Error types for the zenc container

use std::io;
use thiserror::Error;

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for container operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed container framing or header
    #[error("Invalid container format: {0}")]
    Format(String),

    /// Well-formed header describing a version or KDF we do not support
    #[error("Unsupported container ({0}): patch is stale or incompatible, obtain a newer version")]
    UnsupportedFormat(String),

    /// Tag mismatch. Wrong password and tampering are deliberately indistinguishable.
    #[error("Authentication failed: wrong password or corrupted patch")]
    Authentication,
}

impl Error {
    /// Create a new Format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create a new UnsupportedFormat error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::UnsupportedFormat(msg.into())
    }

    /// Check if this error indicates a damaged or forged container
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Format(_) | Error::Authentication)
    }

    /// Check if the container is valid but targets a different format revision
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_))
    }
}
