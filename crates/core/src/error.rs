//! # Errors
//!
//! Domain error types. None of these are fatal: callers degrade to an
//! empty catalog or an empty installed set.

use thiserror::Error;

/// Failure while fetching or parsing the catalog document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog endpoint returned status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog document is not a valid app list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure inside a key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("lock error: {0}")]
    Lock(String),

    #[error("failed to encode slot value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure while persisting the installed set.
///
/// The in-memory set is left at its last persisted value when this is returned.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to persist installed apps: {0}")]
    Storage(#[from] StorageError),
}
