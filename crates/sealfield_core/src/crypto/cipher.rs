//! Authenticated encryption using AES-256-GCM.

use super::key::EncryptionKey;
use crate::error::{CoreError, CoreResult};
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use std::fmt;

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Why a ciphertext could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecryptFailure {
    /// The envelope payload is not valid base64.
    Malformed,
    /// The payload is shorter than a nonce plus tag.
    Truncated,
    /// Authentication failed: wrong key or tampered/corrupted ciphertext.
    Authentication,
    /// Decryption succeeded but the plaintext is not UTF-8.
    InvalidUtf8,
}

impl DecryptFailure {
    /// Stable lowercase label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Truncated => "truncated",
            Self::Authentication => "authentication",
            Self::InvalidUtf8 => "invalid-utf8",
        }
    }
}

impl fmt::Display for DecryptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::Malformed => "payload is not valid base64",
            Self::Truncated => "ciphertext too short",
            Self::Authentication => "authentication failed (wrong key or tampered data)",
            Self::InvalidUtf8 => "plaintext is not valid UTF-8",
        };
        f.write_str(message)
    }
}

impl std::error::Error for DecryptFailure {}

/// AES-256-GCM cipher bound to one key.
///
/// Output format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
pub struct Cipher {
    cipher: Aes256Gcm,
    fingerprint: String,
}

impl Cipher {
    /// Creates a cipher for the given key.
    #[must_use]
    pub fn new(key: &EncryptionKey) -> Self {
        // EncryptionKey is always exactly KEY_SIZE bytes, matching AES-256.
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        Self {
            cipher,
            fingerprint: key.fingerprint(),
        }
    }

    /// Fingerprint of the key this cipher was built from.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Encrypts `plaintext` under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns an error if the AEAD implementation rejects the input.
    pub fn seal(&self, plaintext: &[u8]) -> CoreResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CoreError::encryption_failed("encryption error"))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend(ciphertext);

        Ok(result)
    }

    /// Decrypts data produced by [`seal`](Self::seal).
    ///
    /// # Errors
    ///
    /// Returns [`DecryptFailure::Truncated`] for short input and
    /// [`DecryptFailure::Authentication`] for a wrong key or tampered data.
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, DecryptFailure> {
        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(DecryptFailure::Truncated);
        }

        let (nonce, encrypted) = sealed.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), encrypted)
            .map_err(|_| DecryptFailure::Authentication)
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("algorithm", &"Aes256Gcm")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}
