//! # sealfield core
//!
//! Field-level encryption at rest for schema-described records.
//!
//! This crate provides:
//! - A versioned envelope (`enc:v1:`) around AES-256-GCM ciphertext
//! - Resolution of sensitive fields from collection schemas
//! - Permission-gated disclosure: plaintext or a mask per reader
//! - A write path that encrypts before persistence and a read gateway that
//!   decrypts or masks after fetching
//! - Batch maintenance: encrypt-existing, decrypt-existing and rekey, with
//!   dry runs and per-record error isolation
//!
//! ## Example
//!
//! ```rust
//! use sealfield_core::{
//!     BatchEngine, BatchOptions, EncryptionKey, FieldDefinition, FieldEnvelope, Schema,
//!     SchemaRegistry, SensitiveFieldResolver,
//! };
//! use sealfield_storage::{InMemoryStore, Record};
//! use std::sync::Arc;
//!
//! let schemas = SchemaRegistry::with_schemas([Schema::new("contact")
//!     .field(FieldDefinition::text("email").sensitive())]);
//! let resolver = SensitiveFieldResolver::new(Arc::new(schemas));
//! let envelope = FieldEnvelope::new(&EncryptionKey::generate());
//! let store = InMemoryStore::with_records([
//!     Record::with_id("r1", "contact").field("email", "john@example.com"),
//! ]);
//!
//! let engine = BatchEngine::new(&store, &envelope, &resolver);
//! let report = engine.encrypt_existing(&BatchOptions::new()).unwrap();
//! assert_eq!(report.updated, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod batch;
mod config;
pub mod crypto;
mod envelope;
mod error;
mod gateway;
mod notify;
mod resolver;
mod schema;
mod sealed;
mod write_path;

pub use access::{
    collection_permission, AccessPolicy, Disclosure, Identity, IdentitySource,
    StaticIdentitySource, GLOBAL_PERMISSION,
};
pub use batch::{BatchEngine, BatchOperation, BatchOptions, BatchReport, RecordFailure};
pub use config::{Config, DisclosurePolicy, DEFAULT_MASK, DEFAULT_NOTIFY_WINDOW};
pub use crypto::{Cipher, DecryptFailure, EncryptionKey};
pub use envelope::{
    envelope_version, is_enveloped, Decryption, FieldEnvelope, ENVELOPE_VERSION, MARKER,
    MARKER_PREFIX,
};
pub use error::{CoreError, CoreResult};
pub use gateway::{DecryptionGateway, RevealSummary};
pub use notify::{FailureNotifier, NoopNotifier, Notifier, NotifyError, DECRYPT_FAILURE_MESSAGE};
pub use resolver::SensitiveFieldResolver;
pub use schema::{FieldDefinition, Schema, SchemaRegistry, SchemaSource};
pub use sealed::SealedStore;
pub use write_path::WriteEncryptor;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
