//! Setup and reporting shared by the maintenance commands.

use super::{BatchSettings, CliError, OutputFormat, StoreSettings};
use sealfield_core::{
    BatchEngine, BatchOptions, BatchReport, EncryptionKey, FieldEnvelope, SchemaRegistry,
    SensitiveFieldResolver,
};
use sealfield_storage::{FileStore, StoreLock};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// An opened, locked store ready for a batch run.
pub struct Maintenance {
    store: FileStore,
    envelope: FieldEnvelope,
    resolver: SensitiveFieldResolver,
    _lock: StoreLock,
}

impl Maintenance {
    /// Validates the settings, loads the schema and locks the store.
    pub fn open(settings: &StoreSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let store_path = settings.store.as_deref().ok_or(CliError::MissingStore)?;
        let schema_path = settings.schema.as_deref().ok_or(CliError::MissingSchema)?;
        let key = EncryptionKey::parse(settings.key.as_deref().ok_or(CliError::MissingKey)?)?;

        if !store_path.is_dir() {
            return Err(CliError::StoreNotFound(store_path.to_path_buf()).into());
        }

        let schemas = SchemaRegistry::from_path(schema_path)?;
        let store = FileStore::open(store_path)?;
        let lock = store.lock_exclusive()?;

        info!(
            store = %store_path.display(),
            key = %key.fingerprint(),
            "opened record store"
        );

        Ok(Self {
            store,
            envelope: FieldEnvelope::new(&key),
            resolver: SensitiveFieldResolver::new(Arc::new(schemas)),
            _lock: lock,
        })
    }

    /// A batch engine over the raw store.
    pub fn engine(&self) -> BatchEngine<'_> {
        BatchEngine::new(&self.store, &self.envelope, &self.resolver)
    }

    /// Prints the run header.
    pub fn announce(&self, action: &str, settings: &BatchSettings) {
        if settings.format != OutputFormat::Text {
            return;
        }
        println!("{action} in {:?}", self.store.path());
        if let Some(collection) = &settings.collection {
            println!("  collection: {collection}");
        }
        if settings.dry_run {
            println!("(dry run - no changes will be made)");
        }
        println!();
    }
}

impl BatchSettings {
    /// Engine options for these settings.
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            collection: self.collection.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    operation: &'static str,
    dry_run: bool,
    processed: usize,
    updated: usize,
    skipped: usize,
    errors: usize,
    collections: &'a [String],
    failures: Vec<FailureLine<'a>>,
}

#[derive(Serialize)]
struct FailureLine<'a> {
    collection: &'a str,
    record: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    message: &'a str,
}

/// Prints the report and decides the exit status.
///
/// Returns `false` only when errors were counted and the caller asked for
/// `--fail-on-errors`.
pub fn finish(
    report: &BatchReport,
    settings: &BatchSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    match settings.format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => {
            let summary = Summary {
                operation: report.operation.name(),
                dry_run: report.dry_run,
                processed: report.processed,
                updated: report.updated,
                skipped: report.skipped,
                errors: report.errors,
                collections: &report.collections,
                failures: report
                    .failures
                    .iter()
                    .map(|f| FailureLine {
                        collection: &f.collection,
                        record: &f.record,
                        field: f.field.as_deref(),
                        message: &f.message,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(!(settings.fail_on_errors && report.has_errors()))
}

fn print_text(report: &BatchReport) {
    for collection in &report.skipped_collections {
        println!("  - {collection}: no sensitive fields, skipped");
    }
    for collection in &report.collections {
        println!("  ✓ {collection}");
    }

    if report.has_errors() {
        println!();
        println!("⚠ Errors:");
        for failure in &report.failures {
            println!("  {failure}");
        }
    }

    println!();
    println!("{report}");
}
