//! In-memory record store for testing.

use crate::backend::{RecordIter, RecordStore};
use crate::error::{StorageError, StorageResult};
use crate::record::{Record, RecordId};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory record store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use sealfield_storage::{InMemoryStore, Record, RecordStore};
///
/// let store = InMemoryStore::new();
/// let record = Record::with_id("r1", "contact").field("name", "John Doe");
/// store.persist(&record).unwrap();
/// assert_eq!(store.fetch_one(&record.id).unwrap(), Some(record));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<BTreeMap<RecordId, Record>>,
    writes: AtomicUsize,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records.
    ///
    /// Seeding does not count towards [`write_count`](Self::write_count).
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let records = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(records),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns the number of `persist` calls made so far.
    ///
    /// Useful for asserting that dry runs never write.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Serializes the full store contents.
    ///
    /// Two equal dumps mean byte-for-byte identical stored values.
    #[must_use]
    pub fn dump(&self) -> Vec<u8> {
        let records = self.records.read();
        let all: Vec<&Record> = records.values().collect();
        // Records are plain JSON maps; encoding cannot fail.
        serde_json::to_vec(&all).unwrap_or_default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordStore for InMemoryStore {
    fn collections(&self) -> StorageResult<Vec<String>> {
        let handles: BTreeSet<String> = self
            .records
            .read()
            .values()
            .map(|r| r.collection.clone())
            .collect();
        Ok(handles.into_iter().collect())
    }

    fn fetch_one(&self, id: &RecordId) -> StorageResult<Option<Record>> {
        Ok(self.records.read().get(id).cloned())
    }

    fn scan(&self, collection: &str) -> StorageResult<RecordIter<'_>> {
        // Snapshot the IDs, then clone one record at a time so callers may
        // persist while iterating.
        let ids: Vec<RecordId> = self
            .records
            .read()
            .values()
            .filter(|r| r.collection == collection)
            .map(|r| r.id.clone())
            .collect();

        Ok(Box::new(ids.into_iter().filter_map(move |id| {
            self.records.read().get(&id).cloned().map(Ok)
        })))
    }

    fn persist(&self, record: &Record) -> StorageResult<()> {
        if record.collection.is_empty() {
            return Err(StorageError::InvalidKey(format!(
                "record {} has no collection",
                record.id
            )));
        }
        self.records.write().insert(record.id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> StorageResult<bool> {
        Ok(self.records.write().remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PageRequest;

    fn contact(id: &str, name: &str) -> Record {
        Record::with_id(id, "contact").field("name", name)
    }

    #[test]
    fn memory_new_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert!(store.collections().unwrap().is_empty());
    }

    #[test]
    fn memory_persist_and_fetch() {
        let store = InMemoryStore::new();
        let record = contact("r1", "John Doe");

        store.persist(&record).unwrap();

        assert_eq!(store.fetch_one(&"r1".into()).unwrap(), Some(record));
        assert_eq!(store.fetch_one(&"missing".into()).unwrap(), None);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn memory_persist_replaces() {
        let store = InMemoryStore::new();
        store.persist(&contact("r1", "John")).unwrap();
        store.persist(&contact("r1", "Jane")).unwrap();

        assert_eq!(store.len(), 1);
        let found = store.fetch_one(&"r1".into()).unwrap().unwrap();
        assert_eq!(found.get_str("name"), Some("Jane"));
    }

    #[test]
    fn memory_scan_filters_collection() {
        let store = InMemoryStore::with_records([
            contact("a", "A"),
            Record::with_id("b", "newsletter").field("email", "x@y.z"),
            contact("c", "C"),
        ]);

        let ids: Vec<String> = store
            .scan("contact")
            .unwrap()
            .map(|r| r.unwrap().id.to_string())
            .collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(store.count("unknown").unwrap(), 0);
        assert_eq!(store.collections().unwrap(), ["contact", "newsletter"]);
    }

    #[test]
    fn memory_scan_tolerates_writes() {
        let store = InMemoryStore::with_records([contact("a", "A"), contact("b", "B")]);

        for record in store.scan("contact").unwrap() {
            let mut record = record.unwrap();
            record.set("seen", true);
            store.persist(&record).unwrap();
        }

        assert_eq!(store.write_count(), 2);
        let all = store.fetch_all("contact").unwrap();
        assert!(all.iter().all(|r| r.get("seen").is_some()));
    }

    #[test]
    fn memory_fetch_page() {
        let store = InMemoryStore::with_records(
            (0..5).map(|i| contact(&format!("r{i}"), &format!("N{i}"))),
        );

        let page = store.fetch_page("contact", PageRequest::new(2, 2)).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.last_page(), 3);
        let ids: Vec<&str> = page.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["r2", "r3"]);

        let beyond = store.fetch_page("contact", PageRequest::new(9, 2)).unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[test]
    fn memory_delete() {
        let store = InMemoryStore::with_records([contact("r1", "John")]);
        assert!(store.delete(&"r1".into()).unwrap());
        assert!(!store.delete(&"r1".into()).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn memory_rejects_record_without_collection() {
        let store = InMemoryStore::new();
        let record = Record::with_id("r1", "");
        assert!(matches!(
            store.persist(&record),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn memory_dump_changes_only_on_write() {
        let store = InMemoryStore::with_records([contact("r1", "John")]);
        let before = store.dump();
        let _ = store.fetch_all("contact").unwrap();
        assert_eq!(before, store.dump());

        store.persist(&contact("r1", "Jane")).unwrap();
        assert_ne!(before, store.dump());
    }
}
