//! Symmetric key material.

use crate::error::{CoreError, CoreResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Prefix marking a base64-encoded key string.
pub const BASE64_KEY_PREFIX: &str = "base64:";

/// Encryption key for AES-256-GCM.
///
/// The key is automatically zeroized when dropped. Keys are never persisted
/// by sealfield; the environment supplies them per operation.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generates a new random encryption key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CoreError::invalid_key_size(bytes.len(), KEY_SIZE));
        }

        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Parses a key string as found in environment files.
    ///
    /// Accepts `base64:<standard base64>` or a raw 32-byte string.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty string, undecodable base64, or a key of
    /// the wrong length.
    pub fn parse(value: &str) -> CoreResult<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CoreError::invalid_key("no key provided"));
        }

        match value.strip_prefix(BASE64_KEY_PREFIX) {
            Some(encoded) => {
                let mut raw = STANDARD
                    .decode(encoded)
                    .map_err(|e| CoreError::invalid_key(format!("could not base64-decode the key: {e}")))?;
                let key = Self::from_bytes(&raw);
                raw.zeroize();
                key
            }
            None => Self::from_bytes(value.as_bytes()),
        }
    }

    /// Returns the key as a byte slice.
    ///
    /// # Security
    ///
    /// Be careful with this method - don't log or serialize the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Encodes the key in `base64:` form.
    #[must_use]
    pub fn to_base64_string(&self) -> String {
        format!("{BASE64_KEY_PREFIX}{}", STANDARD.encode(self.bytes))
    }

    /// Short, non-reversible identifier for logs.
    ///
    /// First 8 hex digits of the SHA-256 of the key.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.bytes);
        digest[..4].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("fingerprint", &self.fingerprint())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
