//! Error types for the screenshot repository.

use std::path::PathBuf;
use thiserror::Error;

/// Repository and content store errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache file {path:?}: {reason}")]
    CorruptCache { path: PathBuf, reason: String },

    #[error("Screenshot not found: {0}")]
    NotFound(String),

    #[error("Import of {id} failed: {reason}")]
    ImportFailed { id: String, reason: String },

    #[error("Screenshot {id} cannot change its creation timestamp")]
    CreatedChanged { id: String },

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

impl RepositoryError {
    /// Wrap an I/O error together with the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepositoryError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by a media backend (probing, thumbnail rendering)
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to decode media: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("Unsupported media operation: {0}")]
    Unsupported(String),

    #[error("Media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for MediaError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => MediaError::Io(e),
            image::ImageError::Encoding(e) => MediaError::Encode(e.to_string()),
            other => MediaError::Decode(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("Configuration validation failed:\n{0}")]
    Validation(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}
