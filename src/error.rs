//! Error types
//!
//! Library-level errors. Registry and store operations absorb these and log;
//! they only surface from the storage and config layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the durable key-value storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid storage key '{0}' (allowed: A-Z a-z 0-9 _ -)")]
    InvalidKey(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures while reading or writing `config.ron`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write config {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}
