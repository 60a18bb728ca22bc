//! File-based record store.
//!
//! Layout on disk:
//!
//! ```text
//! <root>/
//! ├─ LOCK                    # Advisory lock for maintenance runs
//! └─ <collection>/
//!    ├─ <record-id>.json     # One record per file
//!    └─ ...
//! ```
//!
//! Records are written to a temporary file and renamed into place, so a
//! crash mid-write leaves either the old or the new version.

use crate::backend::{RecordIter, RecordStore};
use crate::error::{StorageError, StorageResult};
use crate::record::{Record, RecordId};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const RECORD_EXT: &str = "json";
const TEMP_EXT: &str = "json.tmp";

/// A record store keeping one JSON file per record.
///
/// # Thread Safety
///
/// The store holds no in-process state beyond its root path; concurrent
/// writers to the same record are the caller's responsibility. Use
/// [`lock_exclusive`](Self::lock_exclusive) to keep other processes out
/// during maintenance.
///
/// # Example
///
/// ```no_run
/// use sealfield_storage::{FileStore, Record, RecordStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("submissions")).unwrap();
/// store.persist(&Record::new("contact").field("name", "John Doe")).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

/// Exclusive advisory lock on a [`FileStore`], released on drop.
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
}

impl FileStore {
    /// Opens a store rooted at `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Takes the store's exclusive lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another process holds the lock.
    pub fn lock_exclusive(&self) -> StorageResult<StoreLock> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.root.join(LOCK_FILE))?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        Ok(StoreLock { _file: file })
    }

    fn collection_dir(&self, collection: &str) -> StorageResult<PathBuf> {
        validate_key(collection)?;
        Ok(self.root.join(collection))
    }

    fn record_path(&self, collection: &str, id: &RecordId) -> StorageResult<PathBuf> {
        validate_key(id.as_str())?;
        Ok(self
            .collection_dir(collection)?
            .join(format!("{}.{RECORD_EXT}", id.as_str())))
    }

    fn locate(&self, id: &RecordId) -> StorageResult<Option<PathBuf>> {
        validate_key(id.as_str())?;
        for collection in self.collections()? {
            let path = self.record_path(&collection, id)?;
            if path.is_file() {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    let bad = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0'])
        || key.eq_ignore_ascii_case(LOCK_FILE);
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Reads a record file; its contents must match the location it was read from.
fn read_record(path: &Path) -> StorageResult<Record> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let collection = path
        .parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes = fs::read(path)?;
    let record: Record = serde_json::from_slice(&bytes)
        .map_err(|e| StorageError::corrupted(stem.as_str(), e.to_string()))?;

    if record.collection != collection {
        return Err(StorageError::corrupted(
            stem,
            format!(
                "belongs to collection '{}' but is stored under '{collection}'",
                record.collection
            ),
        ));
    }
    if record.id.as_str() != stem {
        return Err(StorageError::corrupted(
            stem,
            format!("file holds record '{}'", record.id),
        ));
    }
    Ok(record)
}

impl RecordStore for FileStore {
    fn collections(&self) -> StorageResult<Vec<String>> {
        let mut handles = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_key(name).is_ok() {
                    handles.push(name.to_string());
                }
            }
        }
        handles.sort();
        Ok(handles)
    }

    fn fetch_one(&self, id: &RecordId) -> StorageResult<Option<Record>> {
        match self.locate(id)? {
            Some(path) => read_record(&path).map(Some),
            None => Ok(None),
        }
    }

    fn scan(&self, collection: &str) -> StorageResult<RecordIter<'_>> {
        let dir = self.collection_dir(collection)?;
        if !dir.is_dir() {
            return Ok(Box::new(std::iter::empty()));
        }

        // Only file names are held in memory; record bodies are read lazily.
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT) {
                paths.push(path);
            }
        }
        paths.sort();

        Ok(Box::new(paths.into_iter().map(|path| read_record(&path))))
    }

    fn persist(&self, record: &Record) -> StorageResult<()> {
        let path = self.record_path(&record.collection, &record.id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(record)?;
        let temp_path = path.with_extension(TEMP_EXT);
        {
            let mut temp = File::create(&temp_path)?;
            temp.write_all(&bytes)?;
            temp.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;

        tracing::trace!(id = %record.id, collection = %record.collection, "record persisted");
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> StorageResult<bool> {
        match self.locate(id)? {
            Some(path) => {
                fs::remove_file(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
