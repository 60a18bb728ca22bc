//! Pre-save stage: envelope sensitive fields before they reach storage.

use crate::envelope::{is_enveloped, FieldEnvelope};
use crate::error::CoreResult;
use crate::resolver::SensitiveFieldResolver;
use sealfield_storage::{Record, Value};
use std::sync::Arc;

/// Encrypts the sensitive fields of a record about to be persisted.
///
/// Null, empty and non-string values are left alone, as are values that
/// already carry the envelope marker, so preparing a record twice is a
/// no-op the second time.
#[derive(Debug)]
pub struct WriteEncryptor {
    envelope: Arc<FieldEnvelope>,
    resolver: Arc<SensitiveFieldResolver>,
    enabled: bool,
}

impl WriteEncryptor {
    /// Creates an encryptor.
    pub fn new(envelope: Arc<FieldEnvelope>, resolver: Arc<SensitiveFieldResolver>) -> Self {
        Self {
            envelope,
            resolver,
            enabled: true,
        }
    }

    /// Honors the global encryption toggle.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Envelopes sensitive plaintext in `record`, returning how many fields
    /// were encrypted.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails; `record` may then be partially
    /// prepared and must not be persisted.
    pub fn prepare(&self, record: &mut Record) -> CoreResult<usize> {
        if !self.enabled {
            return Ok(0);
        }

        let sensitive = self.resolver.resolve(&record.collection);
        let mut encrypted = 0;

        for field in sensitive.iter() {
            let Some(Value::String(value)) = record.fields.get_mut(field) else {
                continue;
            };
            if value.is_empty() || is_enveloped(value) {
                continue;
            }
            *value = self.envelope.encrypt(value)?;
            encrypted += 1;
        }

        if encrypted > 0 {
            tracing::trace!(
                collection = %record.collection,
                record = %record.id,
                fields = encrypted,
                "encrypted sensitive fields"
            );
        }
        Ok(encrypted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionKey;
    use crate::schema::{FieldDefinition, Schema, SchemaRegistry};
    use serde_json::json;

    fn encryptor() -> (WriteEncryptor, Arc<FieldEnvelope>) {
        let schemas = SchemaRegistry::with_schemas([Schema::new("contact")
            .field(FieldDefinition::text("name"))
            .field(FieldDefinition::text("email").sensitive())
            .field(FieldDefinition::text("message").sensitive())]);
        let envelope = Arc::new(FieldEnvelope::new(&EncryptionKey::generate()));
        let resolver = Arc::new(SensitiveFieldResolver::new(Arc::new(schemas)));
        (WriteEncryptor::new(envelope.clone(), resolver), envelope)
    }

    #[test]
    fn encrypts_only_sensitive_strings() {
        let (encryptor, envelope) = encryptor();
        let mut record = Record::with_id("r1", "contact")
            .field("name", "John Doe")
            .field("email", "john@example.com")
            .field("message", "Hello!");

        assert_eq!(encryptor.prepare(&mut record).unwrap(), 2);

        assert_eq!(record.get_str("name"), Some("John Doe"));
        let email = record.get_str("email").unwrap();
        assert!(email.starts_with("enc:v1:"));
        assert_eq!(envelope.decrypt(email).into_value(), "john@example.com");
    }

    #[test]
    fn prepare_is_idempotent() {
        let (encryptor, _) = encryptor();
        let mut record = Record::with_id("r1", "contact").field("email", "john@example.com");

        encryptor.prepare(&mut record).unwrap();
        let once = record.clone();
        assert_eq!(encryptor.prepare(&mut record).unwrap(), 0);
        assert_eq!(record, once);
    }

    #[test]
    fn skips_null_empty_and_structured_values() {
        let (encryptor, _) = encryptor();
        let mut record = Record::with_id("r1", "contact")
            .field("email", "")
            .field("message", json!({"nested": "secret"}));
        record.set("name", Value::Null);
        let before = record.clone();

        assert_eq!(encryptor.prepare(&mut record).unwrap(), 0);
        assert_eq!(record, before);
    }

    #[test]
    fn missing_fields_are_not_created() {
        let (encryptor, _) = encryptor();
        let mut record = Record::with_id("r1", "contact").field("name", "Jane");

        encryptor.prepare(&mut record).unwrap();
        assert!(record.get("email").is_none());
    }

    #[test]
    fn disabled_encryptor_stores_plaintext() {
        let (encryptor, _) = encryptor();
        let encryptor = encryptor.enabled(false);
        let mut record = Record::with_id("r1", "contact").field("email", "john@example.com");

        assert_eq!(encryptor.prepare(&mut record).unwrap(), 0);
        assert_eq!(record.get_str("email"), Some("john@example.com"));
    }

    #[test]
    fn unknown_collection_is_untouched() {
        let (encryptor, _) = encryptor();
        let mut record = Record::with_id("r1", "survey").field("email", "a@b.c");

        assert_eq!(encryptor.prepare(&mut record).unwrap(), 0);
        assert_eq!(record.get_str("email"), Some("a@b.c"));
    }
}
