//! Cryptographic primitives for sealfield.
//!
//! Field values are encrypted with AES-256-GCM.
//!
//! ## Security Model
//!
//! - Uses AES-256-GCM for authenticated encryption
//! - Unique random nonce per encryption operation
//! - Keys are zeroized on drop and never persisted
//! - Keys are identified in logs only by a SHA-256 fingerprint
//!
//! ## Usage
//!
//! ```
//! use sealfield_core::crypto::{Cipher, EncryptionKey};
//!
//! let key = EncryptionKey::generate();
//! let cipher = Cipher::new(&key);
//!
//! let sealed = cipher.seal(b"secret data").unwrap();
//! assert_eq!(cipher.open(&sealed).unwrap(), b"secret data");
//! ```

mod cipher;
mod key;

pub use cipher::{Cipher, DecryptFailure, NONCE_SIZE, TAG_SIZE};
pub use key::{EncryptionKey, BASE64_KEY_PREFIX, KEY_SIZE};
