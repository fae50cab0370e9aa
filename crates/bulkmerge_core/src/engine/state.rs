//! Sync phases, statistics and reports.

use crate::mode::SyncMode;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// The phase a synchronization call is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPhase {
    /// No call has run yet.
    Idle,
    /// Resolving the record type's schema.
    Resolving,
    /// Building the transfer buffer.
    Materializing,
    /// Planning the merge and creating the staging table.
    Staging,
    /// Bulk-writing rows.
    Transferring,
    /// Executing the merge.
    Merging,
    /// Dropping the staging table.
    CleaningUp,
    /// The call succeeded.
    Done,
    /// The call failed.
    Failed,
}

impl SyncPhase {
    /// Returns true for phases that end a call.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Done | SyncPhase::Failed)
    }

    /// Returns true if a call is running.
    pub fn is_active(&self) -> bool {
        !self.is_terminal() && *self != SyncPhase::Idle
    }

    /// Returns true if a call may move from `self` to `next`.
    ///
    /// `Staging` and `Merging` are skipped by [`SyncMode::ReplaceAll`], which
    /// goes from `Materializing` to `Transferring` to `Done`.
    pub fn can_transition_to(&self, next: SyncPhase) -> bool {
        use SyncPhase::*;
        match (self, next) {
            (Idle | Done | Failed, Resolving) => true,
            (Resolving, Materializing) => true,
            (Materializing, Staging | Transferring) => true,
            (Staging, Transferring) => true,
            (Transferring, Merging | Done) => true,
            (Merging, CleaningUp) => true,
            (CleaningUp, Done) => true,
            (current, Failed) => current.is_active(),
            _ => false,
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Resolving => "resolving the schema",
            SyncPhase::Materializing => "materializing records",
            SyncPhase::Staging => "preparing the staging table",
            SyncPhase::Transferring => "transferring rows",
            SyncPhase::Merging => "merging",
            SyncPhase::CleaningUp => "cleaning up",
            SyncPhase::Done => "done",
            SyncPhase::Failed => "failed",
        })
    }
}

/// Cumulative statistics of a [`crate::SyncEngine`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStats {
    /// Calls that completed.
    pub calls_succeeded: u64,
    /// Calls that returned an error.
    pub calls_failed: u64,
    /// Rows materialized by successful calls.
    pub rows_materialized: u64,
    /// Rows bulk-written by successful calls.
    pub rows_transferred: u64,
    /// Target rows inserted, updated or deleted by successful calls.
    pub rows_affected: u64,
    /// Duration of the last successful call.
    pub last_duration: Option<Duration>,
    /// Message of the last error.
    pub last_error: Option<String>,
}

/// Outcome of a successful synchronization call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Mode that ran.
    pub mode: SyncMode,
    /// Target table.
    pub table: String,
    /// Staging table used, if any. It no longer exists.
    pub staging_table: Option<String>,
    /// Records turned into buffer rows.
    pub rows_materialized: u64,
    /// Rows bulk-written into the target or the staging table.
    pub rows_transferred: u64,
    /// Target rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Wall-clock duration of the call.
    pub duration: Duration,
}
