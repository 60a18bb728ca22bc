//! Bulk maintenance over stored records.
//!
//! Three operations share one traversal:
//!
//! - **encrypt-existing** envelopes sensitive plaintext with the current key
//! - **decrypt-existing** replaces enveloped values with their plaintext
//! - **rekey** moves values from an old key to the current key
//!
//! The engine talks to a [`RecordStore`] directly, so neither the write path
//! nor the decryption gateway is involved. Records are streamed one at a
//! time and processed independently: a failing field or record is counted
//! and the run continues. A record is written at most once, only if one of
//! its fields changed, and never during a dry run.
//!
//! Every operation is safe to re-run. Values already in the target state
//! are detected and counted as skipped, so an interrupted run can simply be
//! started again.

mod report;
mod transform;

pub use report::{BatchOperation, BatchReport, RecordFailure};

use crate::crypto::{Cipher, EncryptionKey};
use crate::envelope::FieldEnvelope;
use crate::error::{CoreError, CoreResult};
use crate::resolver::SensitiveFieldResolver;
use sealfield_storage::{Record, RecordStore, StorageError, Value};
use transform::{FieldOutcome, Transform};

/// Options shared by every batch operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Restrict the run to one collection.
    pub collection: Option<String>,
    /// Compute and report changes without persisting them.
    pub dry_run: bool,
}

impl BatchOptions {
    /// Options covering every collection, persisting changes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the run to one collection.
    #[must_use]
    pub fn collection(mut self, handle: impl Into<String>) -> Self {
        self.collection = Some(handle.into());
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Runs maintenance operations against raw storage.
///
/// Collections are taken from the resolver's schema source. The global
/// `enabled` toggle is not consulted: these operations are explicit
/// operator actions.
pub struct BatchEngine<'a> {
    store: &'a dyn RecordStore,
    envelope: &'a FieldEnvelope,
    resolver: &'a SensitiveFieldResolver,
}

impl<'a> BatchEngine<'a> {
    /// Creates an engine; `envelope` holds the current key.
    pub fn new(
        store: &'a dyn RecordStore,
        envelope: &'a FieldEnvelope,
        resolver: &'a SensitiveFieldResolver,
    ) -> Self {
        Self {
            store,
            envelope,
            resolver,
        }
    }

    /// Envelopes every plaintext sensitive value with the current key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CollectionNotFound`] for an unknown collection
    /// filter. Per-record problems are counted in the report instead.
    pub fn encrypt_existing(&self, options: &BatchOptions) -> CoreResult<BatchReport> {
        self.run(&Transform::Encrypt, options)
    }

    /// Replaces every enveloped sensitive value with its plaintext.
    ///
    /// Values that cannot be decrypted with the current key are left in
    /// place and counted as errors.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CollectionNotFound`] for an unknown collection
    /// filter.
    pub fn decrypt_existing(&self, options: &BatchOptions) -> CoreResult<BatchReport> {
        self.run(&Transform::Decrypt, options)
    }

    /// Re-envelopes values sealed under `old_key` with the current key.
    ///
    /// Values that only the current key opens are counted as skipped.
    /// Values neither key opens are left untouched and counted as errors.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CollectionNotFound`] for an unknown collection
    /// filter.
    pub fn rekey(&self, old_key: &EncryptionKey, options: &BatchOptions) -> CoreResult<BatchReport> {
        let old = Cipher::new(old_key);
        tracing::info!(
            old_key = old.fingerprint(),
            current_key = self.envelope.cipher().fingerprint(),
            "rekeying sensitive fields"
        );
        if old.fingerprint() == self.envelope.cipher().fingerprint() {
            tracing::warn!("old key matches the current key; values will be re-sealed in place");
        }
        self.run(&Transform::Rekey { old: &old }, options)
    }

    fn run(&self, transform: &Transform<'_>, options: &BatchOptions) -> CoreResult<BatchReport> {
        let collections = self.select_collections(options.collection.as_deref())?;
        let mut report = BatchReport::new(transform.operation(), options.dry_run);

        for collection in collections {
            let fields = self.resolver.resolve(&collection);
            if fields.is_empty() {
                tracing::debug!(collection = %collection, "no sensitive fields, skipping");
                report.skipped_collections.push(collection);
                continue;
            }

            tracing::info!(
                collection = %collection,
                fields = fields.len(),
                operation = %report.operation,
                "processing collection"
            );
            self.process_collection(&collection, &fields, transform, &mut report);
            report.collections.push(collection);
        }

        tracing::info!(
            operation = %report.operation,
            dry_run = report.dry_run,
            processed = report.processed,
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors,
            "batch finished"
        );
        Ok(report)
    }

    fn select_collections(&self, filter: Option<&str>) -> CoreResult<Vec<String>> {
        let source = self.resolver.source();
        match filter {
            Some(handle) if source.contains(handle) => Ok(vec![handle.to_string()]),
            Some(handle) => Err(CoreError::collection_not_found(handle)),
            None => Ok(source.collections()),
        }
    }

    fn process_collection(
        &self,
        collection: &str,
        fields: &[String],
        transform: &Transform<'_>,
        report: &mut BatchReport,
    ) {
        let records = match self.store.scan(collection) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(collection, error = %e, "cannot read collection");
                report.fail(collection, "*", None, e.to_string());
                return;
            }
        };

        for item in records {
            report.processed += 1;
            match item {
                Ok(mut record) => {
                    self.process_record(&mut record, fields, transform, report);
                }
                Err(e) => {
                    let id = match &e {
                        StorageError::Corrupted { id, .. } => id.clone(),
                        _ => "?".to_string(),
                    };
                    tracing::warn!(collection, record = %id, error = %e, "skipping unreadable record");
                    report.fail(collection, id, None, e.to_string());
                }
            }
        }
    }

    fn process_record(
        &self,
        record: &mut Record,
        fields: &[String],
        transform: &Transform<'_>,
        report: &mut BatchReport,
    ) {
        let mut dirty = false;

        for field in fields {
            match transform.apply(self.envelope, record.fields.get(field)) {
                FieldOutcome::Changed(value) => {
                    record.fields.insert(field.clone(), Value::String(value));
                    dirty = true;
                }
                FieldOutcome::Skipped => report.skipped += 1,
                FieldOutcome::Failed(message) => {
                    tracing::warn!(
                        collection = %record.collection,
                        record = %record.id,
                        field = %field,
                        reason = %message,
                        "field not transformed"
                    );
                    report.fail(
                        &record.collection,
                        record.id.as_str(),
                        Some(field.as_str()),
                        message,
                    );
                }
            }
        }

        if !dirty {
            return;
        }

        if report.dry_run {
            tracing::debug!(record = %record.id, "would update record");
            report.updated += 1;
            return;
        }

        match self.store.persist(record) {
            Ok(()) => {
                tracing::debug!(record = %record.id, "updated record");
                report.updated += 1;
            }
            Err(e) => {
                tracing::warn!(record = %record.id, error = %e, "failed to persist record");
                report.fail(&record.collection, record.id.as_str(), None, e.to_string());
            }
        }
    }
}

impl std::fmt::Debug for BatchEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEngine")
            .field("key", &self.envelope.cipher().fingerprint())
            .finish_non_exhaustive()
    }
}
