//! Helpers for command tests.

use super::StoreSettings;
use sealfield_storage::{FileStore, Record, RecordId, RecordStore};
use std::path::Path;
use tempfile::TempDir;

pub const TEST_KEY: &str = "base64:AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";

const SCHEMA: &str = r#"{"collections": [
    {"handle": "contact", "fields": [
        {"handle": "name"},
        {"handle": "email", "sensitive": true},
        {"handle": "message", "type": "textarea", "sensitive": true}
    ]},
    {"handle": "newsletter", "fields": [{"handle": "email"}]}
]}"#;

/// A temp dir holding `schema.json` and a store with one plaintext contact.
pub fn contact_store() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
    write_record(
        dir.path(),
        &Record::with_id("r1", "contact")
            .field("name", "John Doe")
            .field("email", "john@example.com")
            .field("message", "Hello!"),
    );
    dir
}

pub fn settings(dir: &Path) -> StoreSettings {
    StoreSettings {
        store: Some(dir.to_path_buf()),
        schema: Some(dir.join("schema.json")),
        key: Some(TEST_KEY.to_string()),
    }
}

pub fn write_record(dir: &Path, record: &Record) {
    FileStore::open(dir).unwrap().persist(record).unwrap();
}

pub fn read_record(dir: &Path, id: &str) -> Record {
    FileStore::open(dir)
        .unwrap()
        .fetch_one(&RecordId::new(id))
        .unwrap()
        .unwrap()
}
