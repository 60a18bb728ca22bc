//! # sealfield storage
//!
//! Record model and raw storage backends for sealfield.
//!
//! Stores in this crate are **raw**: they persist and return field values
//! exactly as given. Field encryption, decryption and masking live in
//! `sealfield_core`, layered over a [`RecordStore`]. Maintenance tooling uses
//! a store directly to bypass those layers.
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral storage
//! - [`FileStore`] - One JSON file per record, with an advisory lock
//!
//! ## Example
//!
//! ```rust
//! use sealfield_storage::{InMemoryStore, Record, RecordStore};
//!
//! let store = InMemoryStore::new();
//! store.persist(&Record::with_id("r1", "contact").field("name", "John Doe")).unwrap();
//! assert_eq!(store.fetch_all("contact").unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod record;

pub use backend::{Page, PageRequest, RecordIter, RecordStore};
pub use error::{StorageError, StorageResult};
pub use file::{FileStore, StoreLock};
pub use memory::InMemoryStore;
pub use record::{Record, RecordId};

/// Field values are plain JSON values.
pub use serde_json::Value;
