//! Synchronization modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the target table is reconciled with the record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Delete every target row, then bulk-write the records, in one
    /// transaction.
    ReplaceAll,
    /// Update rows whose key exists, insert the rest, leave target-only rows.
    UpsertNoDelete,
    /// Like [`SyncMode::UpsertNoDelete`], and delete target rows missing from
    /// the records.
    UpsertWithDelete,
    /// Delete the target rows whose key matches a record.
    DeleteMatching,
}

impl SyncMode {
    /// All modes, in declaration order.
    pub const ALL: [SyncMode; 4] = [
        SyncMode::ReplaceAll,
        SyncMode::UpsertNoDelete,
        SyncMode::UpsertWithDelete,
        SyncMode::DeleteMatching,
    ];

    /// Returns true if the mode goes through a staging table and a merge.
    pub fn uses_staging(&self) -> bool {
        !matches!(self, SyncMode::ReplaceAll)
    }

    /// Returns the kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::ReplaceAll => "replace-all",
            SyncMode::UpsertNoDelete => "upsert-no-delete",
            SyncMode::UpsertWithDelete => "upsert-with-delete",
            SyncMode::DeleteMatching => "delete-matching",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unknown sync mode `{0}` (expected replace-all, upsert, upsert-with-delete or delete-matching)"
)]
pub struct ParseModeError(String);

impl FromStr for SyncMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace-all" | "replace" => Ok(SyncMode::ReplaceAll),
            "upsert-no-delete" | "upsert" => Ok(SyncMode::UpsertNoDelete),
            "upsert-with-delete" => Ok(SyncMode::UpsertWithDelete),
            "delete-matching" | "delete" => Ok(SyncMode::DeleteMatching),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}
