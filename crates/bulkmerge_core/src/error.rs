//! Error types for bulk synchronization.
//!
//! Every component has its own error type. The strategy engine wraps all of
//! them in [`SyncError`], which is the only error a caller of
//! [`crate::SyncEngine::sync`] ever sees.

use crate::engine::SyncPhase;
use crate::mode::SyncMode;
use std::fmt;
use thiserror::Error;

/// Result type for schema resolution.
pub type SchemaResult<T> = Result<T, SchemaResolutionError>;

/// Result type for record materialization.
pub type MaterializeResult<T> = Result<T, MaterializationError>;

/// Result type for bulk transfers.
pub type TransferResult<T> = Result<T, TransferError>;

/// Result type for merge statement construction.
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Result type for database collaborator calls.
pub type DbResult<T> = Result<T, DbError>;

/// Result type for synchronization calls.
pub type SyncResult<T> = Result<T, SyncError>;

/// A record type could not be mapped to a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaResolutionError {
    /// The mapping names no table.
    #[error("record type {record_type} is not mapped to a table")]
    MissingTable {
        /// Rust type name of the record.
        record_type: &'static str,
    },

    /// No property is flagged as primary key.
    #[error("record type {record_type} has no primary key")]
    MissingPrimaryKey {
        /// Rust type name of the record.
        record_type: &'static str,
    },

    /// The mapping contributes no transferable column.
    #[error("record type {record_type} maps no columns")]
    NoColumns {
        /// Rust type name of the record.
        record_type: &'static str,
    },

    /// Two properties map to the same column name.
    #[error("record type {record_type} maps column {column} more than once")]
    DuplicateColumn {
        /// Rust type name of the record.
        record_type: &'static str,
        /// The repeated column name.
        column: String,
    },

    /// Following the referenced key through key-navigations leads back to a
    /// type already visited.
    #[error("navigation {property} references {referenced_type}, whose key is cyclic")]
    CyclicReferencedKey {
        /// Navigation property name.
        property: String,
        /// Rust type name of the referenced record.
        referenced_type: &'static str,
    },
}

impl SchemaResolutionError {
    /// Creates a missing table error.
    pub fn missing_table(record_type: &'static str) -> Self {
        Self::MissingTable { record_type }
    }

    /// Creates a missing primary key error.
    pub fn missing_primary_key(record_type: &'static str) -> Self {
        Self::MissingPrimaryKey { record_type }
    }
}

/// Building the transfer buffer failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterializationError {
    /// A required navigation property holds no related record.
    #[error("row {row}: navigation {property} is empty but column {column} is not nullable")]
    MissingReference {
        /// Index of the record in the input collection.
        row: usize,
        /// Navigation property name.
        property: String,
        /// Foreign-key column name.
        column: String,
    },

    /// The related record's primary key is null.
    #[error("row {row}: record referenced by {property} has a null primary key")]
    NullReferencedKey {
        /// Index of the record in the input collection.
        row: usize,
        /// Navigation property name.
        property: String,
    },

    /// An accessor produced a value the column cannot hold.
    #[error("row {row}: column {column} of type {sql_type} cannot hold a {value_type} value")]
    TypeMismatch {
        /// Index of the record in the input collection.
        row: usize,
        /// Column name.
        column: String,
        /// Column type as SQL text.
        sql_type: String,
        /// Variant name of the offending value.
        value_type: &'static str,
    },
}

/// Streaming rows into a table failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// A buffer column has no destination.
    #[error("buffer column {column} is not mapped to a destination column")]
    UnmappedColumn {
        /// Buffer column name.
        column: String,
    },

    /// The mapping names a source column the buffer does not have.
    #[error("mapping source {column} is not a buffer column")]
    UnknownSourceColumn {
        /// Mapped source name.
        column: String,
    },

    /// A column appears on one side of the mapping more than once.
    #[error("column {column} is mapped more than once")]
    DuplicateMapping {
        /// Repeated column name.
        column: String,
    },

    /// The database rejected a batch.
    #[error("bulk write into {destination} failed after {rows_written} rows")]
    Write {
        /// Destination table.
        destination: String,
        /// Rows acknowledged before the failing batch.
        rows_written: u64,
        /// Driver error.
        #[source]
        source: DbError,
    },
}

/// A merge statement could not be formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Without key columns there is no match condition.
    #[error("table {table} has no primary key columns to match on")]
    NoKeyColumns {
        /// Target table.
        table: String,
    },

    /// Every column is an identity column.
    #[error("table {table} has no insertable columns")]
    NoInsertColumns {
        /// Target table.
        table: String,
    },

    /// Every column is part of the key.
    #[error("table {table} has no updatable columns")]
    NoUpdateColumns {
        /// Target table.
        table: String,
    },

    /// The mode does not use a merge statement.
    #[error("{mode} does not use a merge statement")]
    NoMerge {
        /// The requested mode.
        mode: SyncMode,
    },
}

/// Broad classification of database collaborator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbErrorKind {
    /// Key, nullability or type constraint rejected the change.
    ConstraintViolation,
    /// A table or column does not exist.
    ObjectNotFound,
    /// The connection was lost.
    Connectivity,
    /// The statement exceeded its timeout.
    Timeout,
    /// The collaborator cannot execute this request.
    Unsupported,
    /// Anything else.
    Other,
}

impl fmt::Display for DbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DbErrorKind::ConstraintViolation => "constraint violation",
            DbErrorKind::ObjectNotFound => "object not found",
            DbErrorKind::Connectivity => "connectivity",
            DbErrorKind::Timeout => "timeout",
            DbErrorKind::Unsupported => "unsupported",
            DbErrorKind::Other => "database error",
        })
    }
}

/// An error reported by a [`crate::Connection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DbError {
    kind: DbErrorKind,
    message: String,
}

impl DbError {
    /// Creates an error of the given kind.
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a constraint violation error.
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::ConstraintViolation, message)
    }

    /// Creates an object not found error.
    pub fn object_not_found(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::ObjectNotFound, message)
    }

    /// Creates a connectivity error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Connectivity, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Timeout, message)
    }

    /// Creates an unsupported request error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Unsupported, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> DbErrorKind {
        self.kind
    }

    /// Returns the driver message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The underlying cause of a failed synchronization.
#[derive(Debug, Error)]
pub enum SyncFailure {
    /// Schema resolution failed.
    #[error(transparent)]
    Schema(#[from] SchemaResolutionError),

    /// Materialization failed.
    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    /// The bulk transfer failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The merge statement could not be built.
    #[error(transparent)]
    Builder(#[from] BuilderError),

    /// A statement failed.
    #[error("statement failed")]
    Statement(#[source] DbError),

    /// Begin or commit failed.
    #[error("transaction failed")]
    Transaction(#[source] DbError),

    /// The staging table could not be dropped after a successful merge.
    #[error("staging cleanup failed")]
    Cleanup(#[source] DbError),

    /// The work failed and so did the rollback.
    #[error("rollback failed: {rollback}")]
    Rollback {
        /// What made the transaction roll back.
        #[source]
        cause: Box<SyncFailure>,
        /// The rollback error.
        rollback: DbError,
    },
}

/// Tag describing which layer a [`SyncError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    /// See [`SchemaResolutionError`].
    SchemaResolution,
    /// See [`MaterializationError`].
    Materialization,
    /// See [`TransferError`].
    Transfer,
    /// See [`BuilderError`].
    Builder,
    /// A statement failed.
    Database,
    /// Begin, commit or rollback failed.
    Transaction,
    /// Dropping the staging table failed.
    Cleanup,
}

impl SyncFailure {
    /// Returns the kind tag for this failure.
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncFailure::Schema(_) => SyncErrorKind::SchemaResolution,
            SyncFailure::Materialization(_) => SyncErrorKind::Materialization,
            SyncFailure::Transfer(_) => SyncErrorKind::Transfer,
            SyncFailure::Builder(_) => SyncErrorKind::Builder,
            SyncFailure::Statement(_) => SyncErrorKind::Database,
            SyncFailure::Transaction(_) | SyncFailure::Rollback { .. } => {
                SyncErrorKind::Transaction
            }
            SyncFailure::Cleanup(_) => SyncErrorKind::Cleanup,
        }
    }
}

/// A synchronization call failed.
///
/// Carries the mode, the record type, the table (once resolved) and the
/// phase in which the failure happened. [`std::error::Error::source`]
/// exposes the [`SyncFailure`] and, through it, the driver error; each
/// message leaves its source out. [`SyncError::report`] joins the chain.
#[derive(Debug, Error)]
#[error("bulk {mode} of {target} failed while {phase}")]
pub struct SyncError {
    mode: SyncMode,
    record_type: &'static str,
    target: String,
    table: Option<String>,
    phase: SyncPhase,
    #[source]
    cause: SyncFailure,
}

impl SyncError {
    pub(crate) fn new(
        mode: SyncMode,
        record_type: &'static str,
        table: Option<String>,
        phase: SyncPhase,
        cause: SyncFailure,
    ) -> Self {
        let target = table.clone().unwrap_or_else(|| record_type.to_owned());
        Self {
            mode,
            record_type,
            target,
            table,
            phase,
            cause,
        }
    }

    /// Returns the kind of the underlying failure.
    pub fn kind(&self) -> SyncErrorKind {
        self.cause.kind()
    }

    /// Returns the synchronization mode of the failed call.
    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Returns the Rust type name of the records being synchronized.
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    /// Returns the target table, if resolution got that far.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the phase that failed.
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Returns the underlying failure.
    pub fn failure(&self) -> &SyncFailure {
        &self.cause
    }

    /// Consumes the error and returns the underlying failure.
    pub fn into_failure(self) -> SyncFailure {
        self.cause
    }

    /// Renders this error and all of its sources on one line.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            report.push_str(": ");
            report.push_str(&err.to_string());
            source = std::error::Error::source(err);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn db_error_display() {
        let err = DbError::constraint_violation("duplicate key (1)");
        assert_eq!(err.to_string(), "constraint violation: duplicate key (1)");
        assert_eq!(err.kind(), DbErrorKind::ConstraintViolation);
    }

    #[test]
    fn sync_error_chains_to_driver_error() {
        let err = SyncError::new(
            SyncMode::UpsertWithDelete,
            "demo::Employee",
            Some("Employees".into()),
            SyncPhase::Merging,
            SyncFailure::Statement(DbError::timeout("merge exceeded 30s")),
        );

        assert_eq!(err.kind(), SyncErrorKind::Database);
        assert_eq!(err.table(), Some("Employees"));
        assert!(err.to_string().contains("upsert-with-delete"));
        assert!(err.to_string().contains("Employees"));

        let failure = err.source().expect("failure");
        let driver = failure.source().expect("driver error");
        assert_eq!(driver.to_string(), "timeout: merge exceeded 30s");
    }

    #[test]
    fn unresolved_table_falls_back_to_type_name() {
        let err = SyncError::new(
            SyncMode::ReplaceAll,
            "demo::Keyless",
            None,
            SyncPhase::Resolving,
            SchemaResolutionError::missing_primary_key("demo::Keyless").into(),
        );
        assert_eq!(err.kind(), SyncErrorKind::SchemaResolution);
        assert!(err.to_string().contains("demo::Keyless"));
    }

    #[test]
    fn rollback_failure_is_a_transaction_error() {
        let failure = SyncFailure::Rollback {
            cause: Box::new(SyncFailure::Statement(DbError::connectivity("reset"))),
            rollback: DbError::connectivity("reset"),
        };
        assert_eq!(failure.kind(), SyncErrorKind::Transaction);
        assert_eq!(failure.to_string(), "rollback failed: connectivity: reset");
        assert!(failure.source().is_some());
    }

    #[test]
    fn report_names_each_cause_once() {
        let err = SyncError::new(
            SyncMode::UpsertNoDelete,
            "demo::Employee",
            Some("Employees".into()),
            SyncPhase::Transferring,
            TransferError::Write {
                destination: "Employees_temp".into(),
                rows_written: 100,
                source: DbError::timeout("bulk write exceeded 30s"),
            }
            .into(),
        );

        assert_eq!(
            err.report(),
            "bulk upsert-no-delete of Employees failed while transferring rows: \
             bulk write into Employees_temp failed after 100 rows: \
             timeout: bulk write exceeded 30s"
        );
        assert_eq!(err.report().matches("exceeded 30s").count(), 1);
    }
}
