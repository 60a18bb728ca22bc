//! Keygen command implementation.

use sealfield_core::EncryptionKey;

/// Prints a freshly generated key in `base64:` form.
pub fn run() {
    println!("{}", EncryptionKey::generate().to_base64_string());
}
