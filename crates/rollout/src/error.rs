//! Error types for writable override stores.
//!
//! Resolution itself has no error path: malformed configuration and
//! malformed override data always degrade to defaults. Errors only arise when
//! developer tooling writes override data back to a store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing to an override store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("override store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object; it is left untouched.
    #[error("override store at {path} is not a JSON object: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Override data could not be serialized.
    #[error("failed to serialize override data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for override store writes.
pub type StoreResult<T> = Result<T, StoreError>;
