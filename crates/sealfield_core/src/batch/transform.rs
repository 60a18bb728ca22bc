//! Per-field transforms applied by the batch engine.

use super::report::BatchOperation;
use crate::crypto::Cipher;
use crate::envelope::{is_enveloped, FieldEnvelope};
use sealfield_storage::Value;

/// Result of transforming one field value.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FieldOutcome {
    /// Replace the stored value.
    Changed(String),
    /// Already in the target state.
    Skipped,
    /// Left untouched and counted as an error.
    Failed(String),
}

/// The work done on each sensitive field.
pub(crate) enum Transform<'a> {
    Encrypt,
    Decrypt,
    Rekey { old: &'a Cipher },
}

impl Transform<'_> {
    pub(crate) fn operation(&self) -> BatchOperation {
        match self {
            Self::Encrypt => BatchOperation::EncryptExisting,
            Self::Decrypt => BatchOperation::DecryptExisting,
            Self::Rekey { .. } => BatchOperation::Rekey,
        }
    }

    /// Transforms `value`; `None` is a missing field.
    pub(crate) fn apply(&self, current: &FieldEnvelope, value: Option<&Value>) -> FieldOutcome {
        let text = match value {
            Some(Value::String(text)) if !text.is_empty() => text.as_str(),
            _ => return FieldOutcome::Skipped,
        };

        match self {
            Self::Encrypt => {
                if is_enveloped(text) {
                    return FieldOutcome::Skipped;
                }
                match FieldEnvelope::seal_with(current.cipher(), text) {
                    Ok(token) => FieldOutcome::Changed(token),
                    Err(e) => FieldOutcome::Failed(e.to_string()),
                }
            }
            Self::Decrypt => {
                if !is_enveloped(text) {
                    return FieldOutcome::Skipped;
                }
                match FieldEnvelope::open_with(current.cipher(), text) {
                    Ok(plaintext) => FieldOutcome::Changed(plaintext),
                    Err(reason) => FieldOutcome::Failed(reason.to_string()),
                }
            }
            Self::Rekey { old } => {
                if !is_enveloped(text) {
                    return FieldOutcome::Skipped;
                }
                match FieldEnvelope::open_with(old, text) {
                    Ok(plaintext) => match FieldEnvelope::seal_with(current.cipher(), &plaintext) {
                        Ok(token) => FieldOutcome::Changed(token),
                        Err(e) => FieldOutcome::Failed(e.to_string()),
                    },
                    // Already under the current key: migrated by an earlier
                    // run or written after rotation.
                    Err(old_reason) => match FieldEnvelope::open_with(current.cipher(), text) {
                        Ok(_) => FieldOutcome::Skipped,
                        Err(current_reason) => FieldOutcome::Failed(format!(
                            "not decryptable with old key ({old_reason}) or current key ({current_reason})"
                        )),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionKey;
    use serde_json::json;

    fn envelope() -> FieldEnvelope {
        FieldEnvelope::new(&EncryptionKey::generate())
    }

    fn text(value: &str) -> Value {
        Value::String(value.to_string())
    }

    #[test]
    fn non_text_values_are_skipped_by_every_transform() {
        let current = envelope();
        let old = Cipher::new(&EncryptionKey::generate());
        let transforms = [
            Transform::Encrypt,
            Transform::Decrypt,
            Transform::Rekey { old: &old },
        ];

        for transform in &transforms {
            assert_eq!(transform.apply(&current, None), FieldOutcome::Skipped);
            assert_eq!(transform.apply(&current, Some(&Value::Null)), FieldOutcome::Skipped);
            assert_eq!(transform.apply(&current, Some(&text(""))), FieldOutcome::Skipped);
            assert_eq!(
                transform.apply(&current, Some(&json!(["a", "b"]))),
                FieldOutcome::Skipped
            );
        }
    }

    #[test]
    fn encrypt_skips_enveloped() {
        let current = envelope();
        let token = current.encrypt("secret").unwrap();

        assert_eq!(
            Transform::Encrypt.apply(&current, Some(&text(&token))),
            FieldOutcome::Skipped
        );
        match Transform::Encrypt.apply(&current, Some(&text("secret"))) {
            FieldOutcome::Changed(token) => {
                assert_eq!(current.decrypt(&token).into_value(), "secret");
            }
            other => panic!("expected change, got {other:?}"),
        }
    }

    #[test]
    fn decrypt_fails_on_foreign_key() {
        let current = envelope();
        let foreign = envelope().encrypt("secret").unwrap();

        assert!(matches!(
            Transform::Decrypt.apply(&current, Some(&text(&foreign))),
            FieldOutcome::Failed(_)
        ));
        assert_eq!(
            Transform::Decrypt.apply(&current, Some(&text("plain"))),
            FieldOutcome::Skipped
        );
    }

    #[test]
    fn rekey_falls_back_to_current_key() {
        let old_key = EncryptionKey::generate();
        let old = Cipher::new(&old_key);
        let current = envelope();
        let rekey = Transform::Rekey { old: &old };

        let under_old = FieldEnvelope::new(&old_key).encrypt("secret").unwrap();
        let migrated = match rekey.apply(&current, Some(&text(&under_old))) {
            FieldOutcome::Changed(token) => token,
            other => panic!("expected change, got {other:?}"),
        };
        assert_eq!(current.decrypt(&migrated).into_value(), "secret");

        assert_eq!(
            rekey.apply(&current, Some(&text(&migrated))),
            FieldOutcome::Skipped
        );

        let unknown = envelope().encrypt("secret").unwrap();
        assert!(matches!(
            rekey.apply(&current, Some(&text(&unknown))),
            FieldOutcome::Failed(_)
        ));
    }
}
