//! CLI command implementations.

pub mod decrypt_existing;
pub mod encrypt_existing;
pub mod keygen;
mod maintenance;
pub mod rekey;

#[cfg(test)]
mod testing;

use clap::ValueEnum;
use std::path::PathBuf;
use thiserror::Error;

/// Setup problems that stop a command before any record is read.
#[derive(Debug, Error)]
pub enum CliError {
    /// `--store` was not given.
    #[error("record store path required (--store)")]
    MissingStore,

    /// `--schema` was not given.
    #[error("schema file required (--schema)")]
    MissingSchema,

    /// Neither `--key` nor `SEALFIELD_KEY` was given.
    #[error("encryption key required (--key or SEALFIELD_KEY)")]
    MissingKey,

    /// The old key was blank.
    #[error("No key provided.")]
    NoKeyProvided,

    /// `--store` does not name an existing directory.
    #[error("record store not found: {0}")]
    StoreNotFound(PathBuf),
}

/// Where the store, schema and current key come from.
#[derive(Debug, Default, Clone)]
pub struct StoreSettings {
    /// Record store directory.
    pub store: Option<PathBuf>,
    /// Schema file.
    pub schema: Option<PathBuf>,
    /// Current key, unparsed.
    pub key: Option<String>,
}

/// How results are printed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object.
    Json,
}

/// Options for a maintenance command.
#[derive(Debug, Default, Clone)]
pub struct BatchSettings {
    /// Only process this collection.
    pub collection: Option<String>,
    /// Report without writing.
    pub dry_run: bool,
    /// Turn counted errors into a failing exit status.
    pub fail_on_errors: bool,
    /// Output format.
    pub format: OutputFormat,
}
