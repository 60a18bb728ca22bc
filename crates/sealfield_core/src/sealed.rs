//! A record store with transparent field encryption.

use crate::access::{AccessPolicy, IdentitySource};
use crate::config::Config;
use crate::crypto::EncryptionKey;
use crate::envelope::FieldEnvelope;
use crate::error::CoreResult;
use crate::gateway::DecryptionGateway;
use crate::notify::{FailureNotifier, Notifier};
use crate::resolver::SensitiveFieldResolver;
use crate::schema::SchemaSource;
use crate::write_path::WriteEncryptor;
use sealfield_storage::{Page, PageRequest, Record, RecordId, RecordStore};
use std::sync::Arc;

/// Wraps a [`RecordStore`] with the write path and the decryption gateway.
///
/// Records are encrypted on [`save`](Self::save) and decrypted or masked
/// for the current identity on every read. Use [`raw`](Self::raw) to reach
/// the stored values directly.
///
/// # Example
///
/// ```rust
/// use sealfield_core::{
///     Config, EncryptionKey, FieldDefinition, Identity, Schema, SchemaRegistry, SealedStore,
///     StaticIdentitySource,
/// };
/// use sealfield_storage::{InMemoryStore, Record, RecordStore};
/// use std::sync::Arc;
///
/// let schemas = SchemaRegistry::with_schemas([Schema::new("contact")
///     .field(FieldDefinition::text("email").sensitive())]);
/// let store = SealedStore::new(
///     InMemoryStore::new(),
///     &EncryptionKey::generate(),
///     Arc::new(schemas),
///     Arc::new(StaticIdentitySource::acting_as(Identity::superuser("admin"))),
///     &Config::default(),
/// );
///
/// let mut record = Record::with_id("r1", "contact").field("email", "john@example.com");
/// store.save(&mut record).unwrap();
///
/// let stored = store.raw().fetch_one(&record.id).unwrap().unwrap();
/// assert!(stored.get_str("email").unwrap().starts_with("enc:v1:"));
///
/// let read = store.find(&record.id).unwrap().unwrap();
/// assert_eq!(read.get_str("email"), Some("john@example.com"));
/// ```
pub struct SealedStore<S, I> {
    store: S,
    identities: Arc<I>,
    envelope: Arc<FieldEnvelope>,
    resolver: Arc<SensitiveFieldResolver>,
    writer: WriteEncryptor,
    gateway: DecryptionGateway,
    config: Config,
}

impl<S, I> SealedStore<S, I>
where
    S: RecordStore,
    I: IdentitySource + 'static,
{
    /// Creates a sealed store over `store` using `key` as the current key.
    pub fn new(
        store: S,
        key: &EncryptionKey,
        schemas: Arc<dyn SchemaSource>,
        identities: Arc<I>,
        config: &Config,
    ) -> Self {
        let envelope = Arc::new(FieldEnvelope::new(key).with_mask(config.mask.clone()));
        let resolver = Arc::new(SensitiveFieldResolver::new(schemas));
        let writer =
            WriteEncryptor::new(envelope.clone(), resolver.clone()).enabled(config.enabled);
        let gateway = DecryptionGateway::new(
            envelope.clone(),
            resolver.clone(),
            identities.clone(),
            AccessPolicy::new(config.disclosure),
        )
        .enabled(config.enabled);

        Self {
            store,
            identities,
            envelope,
            resolver,
            writer,
            gateway,
            config: config.clone(),
        }
    }

    /// Routes decrypt-failure alerts to `notifier`, deduplicated per
    /// collection within the configured window.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        let failures = Arc::new(FailureNotifier::new(notifier, self.config.notify_window));
        self.gateway = self.gateway.with_notifier(failures);
        self
    }

    /// The underlying store, bypassing encryption and decryption.
    #[must_use]
    pub fn raw(&self) -> &S {
        &self.store
    }

    /// The identity source consulted on reads.
    #[must_use]
    pub fn identities(&self) -> &I {
        &self.identities
    }

    /// The envelope for the current key.
    #[must_use]
    pub fn envelope(&self) -> &Arc<FieldEnvelope> {
        &self.envelope
    }

    /// The sensitive-field resolver; invalidate it after schema changes.
    #[must_use]
    pub fn resolver(&self) -> &Arc<SensitiveFieldResolver> {
        &self.resolver
    }

    /// Fetches one record, revealed for the current identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read.
    pub fn find(&self, id: &RecordId) -> CoreResult<Option<Record>> {
        let mut record = self.store.fetch_one(id)?;
        if let Some(record) = record.as_mut() {
            self.gateway.reveal(record);
        }
        Ok(record)
    }

    /// Fetches every record in a collection, revealed.
    ///
    /// # Errors
    ///
    /// Returns the first read error encountered.
    pub fn where_collection(&self, collection: &str) -> CoreResult<Vec<Record>> {
        let mut records = self.store.fetch_all(collection)?;
        self.gateway.reveal_all(&mut records);
        Ok(records)
    }

    /// Fetches every record in every collection, revealed.
    ///
    /// # Errors
    ///
    /// Returns the first read error encountered.
    pub fn all(&self) -> CoreResult<Vec<Record>> {
        let mut records = Vec::new();
        for collection in self.store.collections()? {
            records.extend(self.where_collection(&collection)?);
        }
        Ok(records)
    }

    /// Fetches one page of a collection, revealed.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid page request or unreadable record.
    pub fn page(&self, collection: &str, request: PageRequest) -> CoreResult<Page<Record>> {
        let mut page = self.store.fetch_page(collection, request)?;
        self.gateway.reveal_page(&mut page);
        Ok(page)
    }

    /// Encrypts the sensitive fields of `record` and persists it.
    ///
    /// `record` is left holding the stored (enveloped) values.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or persistence fails; nothing is
    /// written when encryption fails.
    pub fn save(&self, record: &mut Record) -> CoreResult<()> {
        self.writer.prepare(record)?;
        self.store.persist(record)?;
        Ok(())
    }

    /// Deletes a record. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    pub fn delete(&self, id: &RecordId) -> CoreResult<bool> {
        Ok(self.store.delete(id)?)
    }
}

impl<S, I> std::fmt::Debug for SealedStore<S, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedStore")
            .field("config", &self.config)
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}
