//! Error types for sealfield core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in sealfield core operations.
///
/// Decryption failures on the read path are deliberately absent: they are
/// reported through [`crate::Decryption::Failed`] so reads stay available.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] sealfield_storage::StorageError),

    /// Key material could not be parsed.
    #[error("invalid key: {message}")]
    InvalidKey {
        /// Description of the problem.
        message: String,
    },

    /// Invalid key size.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// Encryption failed.
    #[error("encryption failed: {message}")]
    EncryptionFailed {
        /// Description of the failure.
        message: String,
    },

    /// Collection not found.
    #[error("collection not found: {handle}")]
    CollectionNotFound {
        /// Handle of the collection.
        handle: String,
    },

    /// Schema could not be loaded or is invalid.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates an invalid key size error.
    pub fn invalid_key_size(actual: usize, expected: usize) -> Self {
        Self::InvalidKeySize { expected, actual }
    }

    /// Creates an encryption failed error.
    pub fn encryption_failed(message: impl Into<String>) -> Self {
        Self::EncryptionFailed {
            message: message.into(),
        }
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(handle: impl Into<String>) -> Self {
        Self::CollectionNotFound {
            handle: handle.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Returns `true` for errors raised before any data is touched
    /// (bad key material, unknown collection, bad schema).
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey { .. }
                | Self::InvalidKeySize { .. }
                | Self::CollectionNotFound { .. }
                | Self::InvalidSchema { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors() {
        assert!(CoreError::invalid_key("bad base64").is_configuration());
        assert!(CoreError::invalid_key_size(16, 32).is_configuration());
        assert!(CoreError::collection_not_found("contact").is_configuration());
        assert!(!CoreError::encryption_failed("boom").is_configuration());
    }

    #[test]
    fn messages() {
        assert_eq!(
            CoreError::invalid_key_size(16, 32).to_string(),
            "invalid key size: expected 32 bytes, got 16"
        );
        assert_eq!(
            CoreError::collection_not_found("contact").to_string(),
            "collection not found: contact"
        );
    }
}
