//! # Bulkmerge Core
//!
//! Bulk synchronization of typed record collections with relational tables.
//!
//! This crate provides:
//! - Record mapping and cached schema resolution
//! - Materialization of records into a columnar transfer buffer
//! - Bulk transfer with explicit column mappings
//! - `MERGE` statement construction per synchronization mode
//! - The strategy engine with staging-table lifecycle management
//! - An in-memory database for tests and demos
//!
//! ## Modes
//!
//! | Mode | Effect on the target table |
//! |------|----------------------------|
//! | [`SyncMode::ReplaceAll`] | delete every row, insert the records |
//! | [`SyncMode::UpsertNoDelete`] | insert new keys, update existing keys |
//! | [`SyncMode::UpsertWithDelete`] | upsert, then delete keys not in the records |
//! | [`SyncMode::DeleteMatching`] | delete keys present in the records |
//!
//! ## Key Invariants
//!
//! - Records are never mutated
//! - A staging table never outlives the call that created it
//! - `ReplaceAll` is atomic: the target is fully replaced or untouched
//! - Nothing touches the database before the records are materialized

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod connection;
mod engine;
mod error;
mod materialize;
mod memory;
pub mod merge;
mod mode;
pub mod schema;
mod statement;
mod transfer;
mod value;

pub use buffer::TransferBuffer;
pub use config::SyncConfig;
pub use connection::{BulkWrite, BulkWriteOptions, Connection, Transaction};
pub use engine::{SyncEngine, SyncPhase, SyncReport, SyncStats};
pub use error::{
    BuilderError, BuilderResult, DbError, DbErrorKind, DbResult, MaterializationError,
    MaterializeResult, SchemaResolutionError, SchemaResult, SyncError, SyncErrorKind, SyncFailure,
    SyncResult, TransferError, TransferResult,
};
pub use materialize::materialize;
pub use memory::{
    FailPoint, LogEntry, MemoryColumn, MemoryConnection, MemoryDatabase, TableDefinition,
};
pub use merge::{MergeClauses, MergeStatement};
pub use mode::{ParseModeError, SyncMode};
pub use schema::{
    resolve, Column, ColumnDescriptor, EntityMapping, Record, Reference, ResolvedSchema,
    SchemaResolver, TableSchema,
};
pub use statement::{Statement, StatementKind};
pub use transfer::{ColumnMapping, ColumnPair, TransferOptions, TransferWriter};
pub use value::{SqlType, Value};
