//! Versioned envelope for encrypted field values.
//!
//! An enveloped value looks like `enc:v1:<base64(nonce || ciphertext || tag)>`.
//! A value either carries the exact marker or is plaintext in its entirety;
//! there is no partial state. Future formats bump the version segment
//! (`enc:v2:`), which a v1 decoder treats as plaintext.

use crate::config::DEFAULT_MASK;
use crate::crypto::{Cipher, DecryptFailure, EncryptionKey};
use crate::error::CoreResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Prefix shared by every envelope version.
pub const MARKER_PREFIX: &str = "enc:";

/// Envelope version written by this build.
pub const ENVELOPE_VERSION: u32 = 1;

/// Full marker for the current version.
pub const MARKER: &str = "enc:v1:";

/// Returns `true` if `value` carries the current envelope marker.
#[must_use]
pub fn is_enveloped(value: &str) -> bool {
    value.starts_with(MARKER)
}

/// Returns the version segment of an `enc:v<N>:` value, if present.
///
/// Only [`ENVELOPE_VERSION`] is decodable; other versions are reported so
/// callers can tell a future-format value from plaintext.
#[must_use]
pub fn envelope_version(value: &str) -> Option<u32> {
    let rest = value.strip_prefix(MARKER_PREFIX)?.strip_prefix('v')?;
    let (digits, _) = rest.split_once(':')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Outcome of [`FieldEnvelope::decrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decryption {
    /// The value was not enveloped and is returned unchanged.
    Passthrough(String),
    /// The value was opened successfully.
    Decrypted(String),
    /// The value could not be opened; the original token is kept.
    Failed {
        /// The untouched enveloped value.
        token: String,
        /// Why opening failed.
        reason: DecryptFailure,
    },
}

impl Decryption {
    /// Returns `false` only for [`Decryption::Failed`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn failure(&self) -> Option<DecryptFailure> {
        match self {
            Self::Failed { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// The resulting value: plaintext, or the opaque token on failure.
    #[must_use]
    pub fn into_value(self) -> String {
        match self {
            Self::Passthrough(value) | Self::Decrypted(value) => value,
            Self::Failed { token, .. } => token,
        }
    }

    /// Borrowing variant of [`into_value`](Self::into_value).
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Passthrough(value) | Self::Decrypted(value) => value,
            Self::Failed { token, .. } => token,
        }
    }
}

/// Wraps and unwraps field values with the current key.
///
/// Encryption is idempotent and decryption never fails the caller: a value
/// that cannot be opened comes back as [`Decryption::Failed`] carrying the
/// original token.
#[derive(Debug)]
pub struct FieldEnvelope {
    cipher: Cipher,
    mask: String,
}

impl FieldEnvelope {
    /// Creates an envelope for the current key with the default mask.
    #[must_use]
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            cipher: Cipher::new(key),
            mask: DEFAULT_MASK.to_string(),
        }
    }

    /// Replaces the mask placeholder.
    #[must_use]
    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = mask.into();
        self
    }

    /// The cipher for the current key.
    #[must_use]
    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    /// Envelopes `plaintext` with the current key.
    ///
    /// Already-enveloped input is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error only if the AEAD implementation rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> CoreResult<String> {
        if is_enveloped(plaintext) {
            return Ok(plaintext.to_string());
        }
        Self::seal_with(&self.cipher, plaintext)
    }

    /// Opens an enveloped value with the current key.
    ///
    /// Non-enveloped input is returned unchanged as
    /// [`Decryption::Passthrough`].
    #[must_use]
    pub fn decrypt(&self, value: &str) -> Decryption {
        if !is_enveloped(value) {
            return Decryption::Passthrough(value.to_string());
        }

        match Self::open_with(&self.cipher, value) {
            Ok(plaintext) => Decryption::Decrypted(plaintext),
            Err(reason) => Decryption::Failed {
                token: value.to_string(),
                reason,
            },
        }
    }

    /// Returns `true` if `value` carries the envelope marker.
    #[must_use]
    pub fn is_enveloped(&self, value: &str) -> bool {
        is_enveloped(value)
    }

    /// The placeholder shown to readers without disclosure rights.
    #[must_use]
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// Envelopes `plaintext` with an arbitrary cipher, unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error only if the AEAD implementation rejects the input.
    pub fn seal_with(cipher: &Cipher, plaintext: &str) -> CoreResult<String> {
        let sealed = cipher.seal(plaintext.as_bytes())?;
        Ok(format!("{MARKER}{}", STANDARD.encode(sealed)))
    }

    /// Opens an enveloped token with an arbitrary cipher.
    ///
    /// # Errors
    ///
    /// [`DecryptFailure::Malformed`] if the token lacks the marker or its
    /// payload is not base64; otherwise whatever [`Cipher::open`] reports.
    pub fn open_with(cipher: &Cipher, token: &str) -> Result<String, DecryptFailure> {
        let payload = token
            .strip_prefix(MARKER)
            .ok_or(DecryptFailure::Malformed)?;
        let sealed = STANDARD
            .decode(payload)
            .map_err(|_| DecryptFailure::Malformed)?;
        let plaintext = cipher.open(&sealed)?;
        String::from_utf8(plaintext).map_err(|_| DecryptFailure::InvalidUtf8)
    }
}
