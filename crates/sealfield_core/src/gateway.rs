//! Post-fetch stage: decrypt or mask sensitive fields for the current reader.

use crate::access::{AccessPolicy, Disclosure, IdentitySource};
use crate::envelope::{is_enveloped, Decryption, FieldEnvelope};
use crate::notify::FailureNotifier;
use crate::resolver::SensitiveFieldResolver;
use sealfield_storage::{Page, Record, Value};
use std::sync::Arc;

/// What the gateway did to one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealSummary {
    /// Fields replaced by their plaintext.
    pub decrypted: usize,
    /// Fields replaced by the mask.
    pub masked: usize,
    /// Fields left as opaque tokens because decryption failed.
    pub failed: usize,
}

impl RevealSummary {
    fn absorb(&mut self, other: Self) {
        self.decrypted += other.decrypted;
        self.masked += other.masked;
        self.failed += other.failed;
    }
}

/// Applies disclosure rules to records on their way out of storage.
///
/// Only enveloped, non-empty string values of sensitive fields are touched.
/// Legacy plaintext in a sensitive field passes through unchanged, as do
/// all non-sensitive fields. A decryption failure keeps the opaque token,
/// logs a warning and notifies the operator; the read itself never fails.
pub struct DecryptionGateway {
    envelope: Arc<FieldEnvelope>,
    resolver: Arc<SensitiveFieldResolver>,
    identities: Arc<dyn IdentitySource>,
    policy: AccessPolicy,
    notifier: Arc<FailureNotifier>,
    enabled: bool,
}

impl DecryptionGateway {
    /// Creates a gateway.
    pub fn new(
        envelope: Arc<FieldEnvelope>,
        resolver: Arc<SensitiveFieldResolver>,
        identities: Arc<dyn IdentitySource>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            envelope,
            resolver,
            identities,
            policy,
            notifier: Arc::new(FailureNotifier::disabled()),
            enabled: true,
        }
    }

    /// Sets the operator notifier used on decrypt failures.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<FailureNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Honors the global encryption toggle.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Decrypts or masks the sensitive fields of one record in place.
    pub fn reveal(&self, record: &mut Record) -> RevealSummary {
        let mut summary = RevealSummary::default();
        if !self.enabled {
            return summary;
        }

        let sensitive = self.resolver.resolve(&record.collection);
        if sensitive.is_empty() {
            return summary;
        }

        // Authorization is per record, computed lazily at most once.
        let mut disclosure: Option<Disclosure> = None;

        for field in sensitive.iter() {
            let Some(Value::String(value)) = record.fields.get_mut(field) else {
                continue;
            };
            if value.is_empty() || !is_enveloped(value) {
                continue;
            }

            let decision = *disclosure.get_or_insert_with(|| {
                let identity = self.identities.current_identity();
                self.policy
                    .decide(self.identities.as_ref(), identity.as_ref(), &record.collection)
            });

            match decision {
                Disclosure::Masked => {
                    *value = self.envelope.mask().to_string();
                    summary.masked += 1;
                }
                Disclosure::Plaintext => match self.envelope.decrypt(value) {
                    Decryption::Failed { reason, .. } => {
                        tracing::warn!(
                            collection = %record.collection,
                            record = %record.id,
                            field = %field,
                            reason = reason.as_str(),
                            "failed to decrypt sensitive field value"
                        );
                        self.notifier.decrypt_failed(&record.collection);
                        summary.failed += 1;
                    }
                    decryption => {
                        *value = decryption.into_value();
                        summary.decrypted += 1;
                    }
                },
            }
        }

        summary
    }

    /// Applies [`reveal`](Self::reveal) to every record.
    pub fn reveal_all(&self, records: &mut [Record]) -> RevealSummary {
        let mut summary = RevealSummary::default();
        for record in records.iter_mut() {
            summary.absorb(self.reveal(record));
        }
        summary
    }

    /// Applies [`reveal`](Self::reveal) to every record on a page.
    pub fn reveal_page(&self, page: &mut Page<Record>) -> RevealSummary {
        self.reveal_all(&mut page.items)
    }
}

impl std::fmt::Debug for DecryptionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionGateway")
            .field("policy", &self.policy)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
