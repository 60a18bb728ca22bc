//! Record store trait definition.

use crate::error::{StorageError, StorageResult};
use crate::record::{Record, RecordId};

/// Streaming iterator over the records of one collection.
pub type RecordIter<'a> = Box<dyn Iterator<Item = StorageResult<Record>> + 'a>;

/// A page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: usize,
    /// Number of records per page.
    pub per_page: usize,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Number of records preceding this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    fn validate(&self) -> StorageResult<()> {
        if self.page == 0 {
            return Err(StorageError::InvalidPage("page numbers start at 1".into()));
        }
        if self.per_page == 0 {
            return Err(StorageError::InvalidPage("per_page must be positive".into()));
        }
        Ok(())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 25)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: usize,
    /// The page number (1-based).
    pub page: usize,
    /// Page size used for the request.
    pub per_page: usize,
}

impl<T> Page<T> {
    /// Returns the number of the last page (at least 1).
    #[must_use]
    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page.max(1)).max(1)
    }
}

/// Raw record storage.
///
/// Stores do not interpret field values: whatever is persisted is returned
/// verbatim. Encryption and decryption are layered on top by the core crate,
/// and maintenance tooling talks to a `RecordStore` directly to bypass them.
///
/// # Invariants
///
/// - `persist` followed by `fetch_one` returns an equal record
/// - `scan` yields records one at a time and never requires the whole
///   collection in memory
/// - Iteration order within a collection is stable (sorted by record ID)
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - One JSON file per record on disk
pub trait RecordStore: Send + Sync {
    /// Returns the handles of every collection holding at least one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed.
    fn collections(&self) -> StorageResult<Vec<String>>;

    /// Fetches a single record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read.
    fn fetch_one(&self, id: &RecordId) -> StorageResult<Option<Record>>;

    /// Streams every record in a collection.
    ///
    /// Unknown collections yield an empty iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if iteration cannot start. Individual unreadable
    /// records are reported as `Err` items so callers can continue.
    fn scan(&self, collection: &str) -> StorageResult<RecordIter<'_>>;

    /// Writes a record, replacing any previous version with the same ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn persist(&self, record: &Record) -> StorageResult<()>;

    /// Deletes a record. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    fn delete(&self, id: &RecordId) -> StorageResult<bool>;

    /// Fetches every record in a collection.
    ///
    /// # Errors
    ///
    /// Returns the first read error encountered.
    fn fetch_all(&self, collection: &str) -> StorageResult<Vec<Record>> {
        self.scan(collection)?.collect()
    }

    /// Fetches one page of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid page request or an unreadable record
    /// on the requested page.
    fn fetch_page(&self, collection: &str, request: PageRequest) -> StorageResult<Page<Record>> {
        request.validate()?;

        let start = request.offset();
        let end = start.saturating_add(request.per_page);
        let mut items = Vec::with_capacity(request.per_page);
        let mut total = 0usize;

        for (index, record) in self.scan(collection)?.enumerate() {
            if (start..end).contains(&index) {
                items.push(record?);
            }
            total += 1;
        }

        Ok(Page {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        })
    }

    /// Counts the records in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if iteration cannot start.
    fn count(&self, collection: &str) -> StorageResult<usize> {
        Ok(self.scan(collection)?.count())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    fn collections(&self) -> StorageResult<Vec<String>> {
        (**self).collections()
    }

    fn fetch_one(&self, id: &RecordId) -> StorageResult<Option<Record>> {
        (**self).fetch_one(id)
    }

    fn scan(&self, collection: &str) -> StorageResult<RecordIter<'_>> {
        (**self).scan(collection)
    }

    fn persist(&self, record: &Record) -> StorageResult<()> {
        (**self).persist(record)
    }

    fn delete(&self, id: &RecordId) -> StorageResult<bool> {
        (**self).delete(id)
    }

    fn fetch_all(&self, collection: &str) -> StorageResult<Vec<Record>> {
        (**self).fetch_all(collection)
    }

    fn fetch_page(&self, collection: &str, request: PageRequest) -> StorageResult<Page<Record>> {
        (**self).fetch_page(collection, request)
    }

    fn count(&self, collection: &str) -> StorageResult<usize> {
        (**self).count(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn page_zero_is_invalid() {
        assert!(PageRequest::new(0, 10).validate().is_err());
        assert!(PageRequest::new(1, 0).validate().is_err());
        assert!(PageRequest::new(1, 1).validate().is_ok());
    }

    #[test]
    fn last_page_rounds_up() {
        let page: Page<u8> = Page {
            items: vec![],
            total: 21,
            page: 1,
            per_page: 10,
        };
        assert_eq!(page.last_page(), 3);

        let empty: Page<u8> = Page {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 10,
        };
        assert_eq!(empty.last_page(), 1);
    }
}
