//! Test fixtures and store helpers.
//!
//! Provides a standard set of collections, records, keys and identities,
//! plus sealed stores wired up with them.

use sealfield_core::{
    BatchEngine, Config, EncryptionKey, FieldDefinition, Identity, Schema, SchemaRegistry,
    SealedStore, StaticIdentitySource,
};
use sealfield_storage::{FileStore, InMemoryStore, Record, RecordStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Bytes of the key used before a rotation.
pub const OLD_KEY_BYTES: [u8; 32] = [0x11; 32];

/// Bytes of the current key.
pub const CURRENT_KEY_BYTES: [u8; 32] = [0x22; 32];

/// The deterministic pre-rotation key.
pub fn old_key() -> EncryptionKey {
    EncryptionKey::from_bytes(&OLD_KEY_BYTES).expect("fixture key has the right size")
}

/// The deterministic current key.
pub fn current_key() -> EncryptionKey {
    EncryptionKey::from_bytes(&CURRENT_KEY_BYTES).expect("fixture key has the right size")
}

/// `contact`: `name` plain, `email` and `message` sensitive.
pub fn contact_schema() -> Schema {
    Schema::new("contact")
        .field(FieldDefinition::text("name"))
        .field(FieldDefinition::text("email").sensitive())
        .field(FieldDefinition::text("message").sensitive())
}

/// `support`: `subject` plain, `details` sensitive.
pub fn support_schema() -> Schema {
    Schema::new("support")
        .field(FieldDefinition::text("subject"))
        .field(FieldDefinition::text("details").sensitive())
}

/// `newsletter`: no sensitive fields.
pub fn newsletter_schema() -> Schema {
    Schema::new("newsletter").field(FieldDefinition::text("email"))
}

/// A registry with the contact, support and newsletter collections.
pub fn schema_registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::with_schemas([
        contact_schema(),
        support_schema(),
        newsletter_schema(),
    ]))
}

/// The canonical contact submission.
pub fn john_doe() -> Record {
    Record::with_id("john", "contact")
        .field("name", "John Doe")
        .field("email", "john@example.com")
        .field("message", "Please call me back.")
}

/// A support ticket.
pub fn support_ticket(id: &str) -> Record {
    Record::with_id(id, "support")
        .field("subject", "Login issue")
        .field("details", "My account number is 12345")
}

/// A contact submission with the given ID and email.
pub fn contact(id: &str, email: &str) -> Record {
    Record::with_id(id, "contact")
        .field("name", format!("Contact {id}"))
        .field("email", email)
        .field("message", format!("Message from {id}"))
}

/// A superuser.
pub fn admin() -> Identity {
    Identity::superuser("admin")
}

/// A user without any disclosure permission.
pub fn viewer() -> Identity {
    Identity::user("viewer")
}

/// A user holding the global disclosure permission.
pub fn global_reader() -> Identity {
    Identity::user("global-reader").grant_global()
}

/// A user allowed to read plaintext from `collection` only.
pub fn scoped_reader(collection: &str) -> Identity {
    Identity::user(format!("{collection}-reader")).grant_collection(collection)
}

/// A sealed store over a raw backend, with direct access to both layers.
pub struct TestStore<S> {
    /// The sealed store.
    pub sealed: SealedStore<Arc<S>, StaticIdentitySource>,
    raw: Arc<S>,
    _temp_dir: Option<TempDir>,
}

impl TestStore<InMemoryStore> {
    /// An in-memory store with the fixture schemas and current key.
    pub fn memory() -> Self {
        Self::memory_with(Config::default())
    }

    /// An in-memory store using `config`.
    pub fn memory_with(config: Config) -> Self {
        Self::build(Arc::new(InMemoryStore::new()), config, None)
    }
}

impl TestStore<FileStore> {
    /// A file store in a fresh temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(temp_dir.path()).expect("Failed to open file store");
        Self::build(Arc::new(store), Config::default(), Some(temp_dir))
    }

    /// The store directory.
    pub fn path(&self) -> &Path {
        self.raw.path()
    }
}

impl<S: RecordStore + 'static> TestStore<S> {
    fn build(raw: Arc<S>, config: Config, temp_dir: Option<TempDir>) -> Self {
        let sealed = SealedStore::new(
            Arc::clone(&raw),
            &current_key(),
            schema_registry(),
            Arc::new(StaticIdentitySource::anonymous()),
            &config,
        );
        Self {
            sealed,
            raw,
            _temp_dir: temp_dir,
        }
    }

    /// The raw backend.
    pub fn raw(&self) -> &Arc<S> {
        &self.raw
    }

    /// Switches the reading identity.
    pub fn act_as(&self, identity: Option<Identity>) {
        self.sealed.identities().set(identity);
    }

    /// A batch engine over the raw backend with the current key.
    pub fn batch(&self) -> BatchEngine<'_> {
        BatchEngine::new(
            self.raw.as_ref(),
            self.sealed.envelope(),
            self.sealed.resolver(),
        )
    }

    /// Writes records straight to the backend, bypassing encryption.
    pub fn seed(&self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.raw.persist(&record).expect("Failed to seed record");
        }
    }
}

impl<S> std::ops::Deref for TestStore<S> {
    type Target = SealedStore<Arc<S>, StaticIdentitySource>;

    fn deref(&self) -> &Self::Target {
        &self.sealed
    }
}
