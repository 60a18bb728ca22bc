//! Counters and failure details for a batch run.

use std::fmt;

/// The maintenance operation a run performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    /// Envelope plaintext sensitive values with the current key.
    EncryptExisting,
    /// Replace enveloped sensitive values with their plaintext.
    DecryptExisting,
    /// Re-envelope values sealed under an old key with the current key.
    Rekey,
}

impl BatchOperation {
    /// Command-style name of the operation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EncryptExisting => "encrypt-existing",
            Self::DecryptExisting => "decrypt-existing",
            Self::Rekey => "rekey",
        }
    }
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One error recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Collection handle.
    pub collection: String,
    /// Record identifier (or storage file stem for unreadable records).
    pub record: String,
    /// Field that failed, or `None` when the whole record failed.
    pub field: Option<String>,
    /// What went wrong. Never contains field values.
    pub message: String,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "{}/{} field '{}': {}",
                self.collection, self.record, field, self.message
            ),
            None => write!(f, "{}/{}: {}", self.collection, self.record, self.message),
        }
    }
}

/// Summary of a batch run.
///
/// `processed` and `updated` count records; `skipped` counts fields left
/// alone because they were already in the target state; `errors` counts
/// failed fields plus records that could not be read or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Operation performed.
    pub operation: BatchOperation,
    /// Whether persistence was suppressed.
    pub dry_run: bool,
    /// Records visited.
    pub processed: usize,
    /// Records changed (or that would have been, in a dry run).
    pub updated: usize,
    /// Fields already in the target state.
    pub skipped: usize,
    /// Failed fields and records.
    pub errors: usize,
    /// Collections visited, in order.
    pub collections: Vec<String>,
    /// Collections passed over because they have no sensitive fields.
    pub skipped_collections: Vec<String>,
    /// Details for every counted error.
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub(crate) fn new(operation: BatchOperation, dry_run: bool) -> Self {
        Self {
            operation,
            dry_run,
            processed: 0,
            updated: 0,
            skipped: 0,
            errors: 0,
            collections: Vec::new(),
            skipped_collections: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Returns `true` if any error was counted.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub(crate) fn fail(
        &mut self,
        collection: &str,
        record: impl Into<String>,
        field: Option<&str>,
        message: impl Into<String>,
    ) {
        self.errors += 1;
        self.failures.push(RecordFailure {
            collection: collection.to_string(),
            record: record.into(),
            field: field.map(str::to_string),
            message: message.into(),
        });
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            f.write_str("[DRY RUN] ")?;
        }
        write!(
            f,
            "Done. Processed: {}, Updated: {}, Skipped: {}, Errors: {}",
            self.processed, self.updated, self.skipped, self.errors
        )
    }
}
