//! Bulkmerge CLI
//!
//! Command-line demo of staging-table bulk synchronization against the
//! in-memory database.
//!
//! # Commands
//!
//! - `demo` - Synchronize generated employees and print the report
//! - `plan` - Print the statements a mode would execute
//! - `version` - Show version information

mod commands;
mod employee;

use bulkmerge_core::{SyncConfig, SyncMode};
use clap::{Args, Parser, Subcommand};
use commands::OutputFormat;
use tracing_subscriber::EnvFilter;

/// Bulk synchronization of record collections with tables.
#[derive(Parser)]
#[command(name = "bulkmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize generated employees into an in-memory table
    Demo {
        /// Number of employees to synchronize
        #[arg(short, long, default_value = "5000")]
        rows: usize,

        /// Synchronization mode (replace-all, upsert, upsert-with-delete, delete-matching)
        #[arg(short, long, default_value = "replace-all")]
        mode: SyncMode,

        /// Rows present in the table before the call
        #[arg(short, long, default_value = "0")]
        existing: usize,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the statements a mode would execute for the demo table
    Plan {
        /// Synchronization mode
        #[arg(short, long, default_value = "upsert")]
        mode: SyncMode,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct EngineArgs {
    /// Run the merge inside a transaction
    #[arg(long)]
    transactional_merge: bool,

    /// Give each call its own staging table
    #[arg(long)]
    unique_staging: bool,

    /// Rows per bulk-write batch (0 = one batch)
    #[arg(long, default_value = "0")]
    batch_size: usize,

    /// Staging table suffix
    #[arg(long, default_value = "_temp")]
    staging_suffix: String,
}

impl EngineArgs {
    fn into_config(self) -> SyncConfig {
        SyncConfig::new()
            .with_staging_suffix(self.staging_suffix)
            .with_transactional_merge(self.transactional_merge)
            .with_unique_staging_names(self.unique_staging)
            .with_batch_size(self.batch_size)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Demo {
            rows,
            mode,
            existing,
            engine,
            format,
        } => {
            let options = commands::demo::DemoOptions {
                rows,
                mode,
                existing,
                config: engine.into_config(),
                format,
            };
            commands::demo::run(&options)?;
        }
        Commands::Plan {
            mode,
            engine,
            format,
        } => {
            commands::plan::run(mode, engine.into_config(), format)?;
        }
        Commands::Version => {
            println!("bulkmerge CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
