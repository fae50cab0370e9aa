//! CLI command implementations.

pub mod demo;
pub mod plan;

use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Synchronization failed.
    #[error(transparent)]
    Sync(#[from] bulkmerge_core::SyncError),

    /// The demo record type does not resolve.
    #[error(transparent)]
    Schema(#[from] bulkmerge_core::SchemaResolutionError),

    /// Setting up the demo database failed.
    #[error("database setup failed: {0}")]
    Database(#[from] bulkmerge_core::DbError),

    /// JSON output failed.
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown `--format` value.
    #[error("unknown output format `{0}` (expected text or json)")]
    Format(String),
}

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(CommandError::Format(s.to_owned())),
        }
    }
}
