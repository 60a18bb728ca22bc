//! sealfield CLI
//!
//! Maintenance tools for stores holding encrypted sensitive fields.
//!
//! # Commands
//!
//! - `encrypt-existing` - Encrypt plaintext sensitive values already stored
//! - `decrypt-existing` - Decrypt every enveloped sensitive value
//! - `rekey` - Re-encrypt values from an old key to the current key
//! - `keygen` - Print a fresh key

mod commands;

use clap::{Args, Parser, Subcommand};
use commands::{BatchSettings, OutputFormat, StoreSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Field encryption maintenance for sealfield stores.
#[derive(Parser)]
#[command(name = "sealfield")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the record store directory
    #[arg(global = true, short, long)]
    store: Option<PathBuf>,

    /// Path to the collection schema file (JSON)
    #[arg(global = true, long)]
    schema: Option<PathBuf>,

    /// Current encryption key (`base64:<key>` or 32 raw bytes)
    #[arg(global = true, short, long, env = "SEALFIELD_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by the maintenance commands.
#[derive(Args)]
struct BatchArgs {
    /// Only process this collection
    #[arg(short, long)]
    collection: Option<String>,

    /// Dry run - report what would change without writing
    #[arg(short, long)]
    dry_run: bool,

    /// Exit with status 1 if any record or field failed
    #[arg(long)]
    fail_on_errors: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

impl From<BatchArgs> for BatchSettings {
    fn from(args: BatchArgs) -> Self {
        Self {
            collection: args.collection,
            dry_run: args.dry_run,
            fail_on_errors: args.fail_on_errors,
            format: args.format,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt plaintext values in sensitive fields
    EncryptExisting {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Decrypt enveloped values in sensitive fields back to plaintext
    DecryptExisting {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Re-encrypt values from an old key to the current key
    Rekey {
        /// The previous key (`base64:<key>` or 32 raw bytes); prompted for
        /// when omitted
        #[arg(long)]
        old_key: Option<String>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Generate a new random key
    Keygen,

    /// Show version information
    Version,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = StoreSettings {
        store: cli.store,
        schema: cli.schema,
        key: cli.key,
    };

    let passed = match cli.command {
        Commands::EncryptExisting { batch } => {
            commands::encrypt_existing::run(&settings, &batch.into())?
        }
        Commands::DecryptExisting { batch } => {
            commands::decrypt_existing::run(&settings, &batch.into())?
        }
        Commands::Rekey { old_key, batch } => {
            commands::rekey::run(&settings, old_key.as_deref(), &batch.into())?
        }
        Commands::Keygen => {
            commands::keygen::run();
            true
        }
        Commands::Version => {
            println!("sealfield CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("sealfield core v{}", sealfield_core::VERSION);
            true
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
