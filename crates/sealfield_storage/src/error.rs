//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record is unreadable.
    #[error("record {id} corrupted: {message}")]
    Corrupted {
        /// The record ID (or file stem) that failed.
        id: String,
        /// Description of the problem.
        message: String,
    },

    /// A collection handle or record ID cannot be used as a storage key.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Another process holds the store lock.
    #[error("store locked: another process has exclusive access")]
    Locked,

    /// The requested page is invalid.
    #[error("invalid page request: {0}")]
    InvalidPage(String),
}

impl StorageError {
    /// Creates a corrupted-record error.
    pub fn corrupted(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupted {
            id: id.into(),
            message: message.into(),
        }
    }
}
