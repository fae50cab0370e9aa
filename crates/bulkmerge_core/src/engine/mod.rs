//! The strategy engine.
//!
//! [`SyncEngine::sync`] drives one call through its phases:
//!
//! ```text
//! Resolving -> Materializing -> Staging -> Transferring -> Merging -> CleaningUp -> Done
//! ```
//!
//! [`SyncMode::ReplaceAll`] skips staging and merging: it deletes the target
//! rows and bulk-writes the buffer inside one transaction. The other modes
//! write the buffer into a staging table copied from the target, merge it
//! into the target and drop it again, whether the merge succeeded or not.

mod staging;
mod state;

pub use state::{SyncPhase, SyncReport, SyncStats};

use crate::buffer::TransferBuffer;
use crate::config::SyncConfig;
use crate::connection::{Connection, Transaction};
use crate::error::{SyncError, SyncFailure, SyncResult};
use crate::materialize::materialize;
use crate::merge;
use crate::mode::SyncMode;
use crate::schema::{Record, SchemaResolver, TableSchema};
use crate::statement::Statement;
use crate::transfer::{ColumnMapping, TransferWriter};
use parking_lot::{Mutex, RwLock};
use staging::StagingTable;
use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Synchronizes record collections with their tables.
///
/// The engine is shared freely between threads. Calls that target the same
/// table are serialized (see [`SyncConfig::serialize_per_table`]); calls on
/// different tables run concurrently on their own connections.
#[derive(Debug)]
pub struct SyncEngine {
    config: SyncConfig,
    resolver: SchemaResolver,
    phase: RwLock<SyncPhase>,
    stats: RwLock<SyncStats>,
    table_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl SyncEngine {
    /// Creates an engine.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            resolver: SchemaResolver::new(),
            phase: RwLock::new(SyncPhase::Idle),
            stats: RwLock::new(SyncStats::default()),
            table_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the phase of the most recent call.
    pub fn phase(&self) -> SyncPhase {
        *self.phase.read()
    }

    /// Gets the cumulative stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Gets the schema resolver and its cache.
    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Makes the table reflect `records` according to `mode`.
    ///
    /// The records are only read. On failure the returned [`SyncError`]
    /// names the phase that failed; [`SyncMode::ReplaceAll`] leaves the
    /// target untouched and the staging modes never leave a staging table
    /// behind.
    pub fn sync<T: Record, C: Connection + ?Sized>(
        &self,
        conn: &mut C,
        records: &[T],
        mode: SyncMode,
    ) -> SyncResult<SyncReport> {
        let started = Instant::now();
        let mut run = Run::start(self, mode, type_name::<T>());
        info!(
            mode = %mode,
            record_type = run.record_type,
            records = records.len(),
            "bulk sync started"
        );

        let schema = self.resolver.resolve::<T>().map_err(|e| run.fail(e))?;
        let table_schema = schema.table_schema();
        run.table = Some(table_schema.table_name().to_owned());

        let lock = self
            .config
            .serialize_per_table
            .then(|| self.table_lock(table_schema.table_name()));
        let _serialized = lock.as_ref().map(|l| l.lock());

        run.enter(SyncPhase::Materializing);
        let buffer = materialize(records, &schema).map_err(|e| run.fail(e))?;

        // The caller's own timeout comes back on every exit path below.
        let previous_timeout = match self.config.statement_timeout {
            Some(timeout) => {
                let previous = conn.statement_timeout();
                conn.set_statement_timeout(Some(timeout))
                    .map_err(|e| run.fail(SyncFailure::Statement(e)))?;
                Some(previous)
            }
            None => None,
        };

        let outcome = if mode.uses_staging() {
            self.merge_through_staging(&mut run, conn, table_schema, &buffer, mode)
        } else {
            self.replace_all(&mut run, conn, table_schema, &buffer)
        };
        if let Some(previous) = previous_timeout {
            if let Err(e) = conn.set_statement_timeout(previous) {
                warn!(
                    table = %table_schema.table_name(),
                    error = %e,
                    "failed to restore statement timeout"
                );
            }
        }
        let outcome = outcome?;
        run.enter(SyncPhase::Done);

        let report = SyncReport {
            mode,
            table: table_schema.table_name().to_owned(),
            staging_table: outcome.staging_table,
            rows_materialized: buffer.len() as u64,
            rows_transferred: outcome.rows_transferred,
            rows_affected: outcome.rows_affected,
            duration: started.elapsed(),
        };
        self.record_success(&report);
        info!(
            mode = %mode,
            table = %report.table,
            rows_transferred = report.rows_transferred,
            rows_affected = report.rows_affected,
            elapsed_ms = report.duration.as_millis() as u64,
            "bulk sync finished"
        );
        Ok(report)
    }

    /// Collects `records` and calls [`SyncEngine::sync`].
    pub fn sync_records<T, C, I>(
        &self,
        conn: &mut C,
        records: I,
        mode: SyncMode,
    ) -> SyncResult<SyncReport>
    where
        T: Record,
        C: Connection + ?Sized,
        I: IntoIterator<Item = T>,
    {
        let records: Vec<T> = records.into_iter().collect();
        self.sync(conn, &records, mode)
    }

    /// Returns the statements a call in `mode` would execute, in order.
    ///
    /// Bulk writes are not statements and do not appear. Nothing is
    /// executed and the stats are not touched.
    pub fn preview<T: Record>(&self, mode: SyncMode) -> SyncResult<Vec<Statement>> {
        let record_type = type_name::<T>();
        let schema = self
            .resolver
            .resolve::<T>()
            .map_err(|e| SyncError::new(mode, record_type, None, SyncPhase::Resolving, e.into()))?;
        let table = schema.table_schema().table_name();

        if !mode.uses_staging() {
            return Ok(vec![Statement::delete_all(table)]);
        }

        let staging = self.staging_name(table);
        let merge = merge::plan(schema.table_schema(), &staging, table, mode).map_err(|e| {
            SyncError::new(mode, record_type, Some(table.to_owned()), SyncPhase::Staging, e.into())
        })?;
        Ok(vec![
            Statement::drop_table_if_exists(staging.as_str()),
            Statement::copy_structure(table, staging.as_str()),
            Statement::Merge(merge),
            Statement::drop_table_if_exists(staging),
        ])
    }

    /// Delete everything, then bulk-write, in one transaction.
    fn replace_all<C: Connection + ?Sized>(
        &self,
        run: &mut Run<'_>,
        conn: &mut C,
        schema: &TableSchema,
        buffer: &TransferBuffer,
    ) -> SyncResult<Outcome> {
        let table = schema.table_name();
        let mapping = ColumnMapping::for_schema(schema);
        let writer = TransferWriter::new(self.config.transfer_options(false));

        run.enter(SyncPhase::Transferring);
        let mut tx = Transaction::begin(conn).map_err(|e| run.fail(SyncFailure::Transaction(e)))?;

        match delete_and_write(tx.connection(), table, buffer, &writer, &mapping) {
            Ok((deleted, written)) => {
                tx.commit().map_err(|e| run.fail(SyncFailure::Transaction(e)))?;
                Ok(Outcome {
                    staging_table: None,
                    rows_transferred: written,
                    rows_affected: deleted + written,
                })
            }
            Err(cause) => Err(run.fail(roll_back(tx, cause))),
        }
    }

    /// Stage, merge, drop.
    fn merge_through_staging<C: Connection + ?Sized>(
        &self,
        run: &mut Run<'_>,
        conn: &mut C,
        schema: &TableSchema,
        buffer: &TransferBuffer,
        mode: SyncMode,
    ) -> SyncResult<Outcome> {
        let target = schema.table_name();
        let staging_name = self.staging_name(target);

        run.enter(SyncPhase::Staging);
        let merge = merge::plan(schema, &staging_name, target, mode).map_err(|e| run.fail(e))?;

        conn.execute(&Statement::drop_table_if_exists(staging_name.as_str()))
            .map_err(|e| run.fail(SyncFailure::Statement(e)))?;
        let mut staging = StagingTable::guard(conn, staging_name.clone());
        staging
            .connection()
            .execute(&Statement::copy_structure(target, staging_name.as_str()))
            .map_err(|e| run.fail(SyncFailure::Statement(e)))?;
        debug!(target, staging = %staging_name, "staging table created");

        run.enter(SyncPhase::Transferring);
        let options = self
            .config
            .transfer_options(self.config.staging_keep_identity);
        let writer = TransferWriter::new(options);
        let mapping = ColumnMapping::for_schema(schema);
        let transferred = writer
            .write(staging.connection(), buffer, &staging_name, &mapping)
            .map_err(|e| run.fail(e))?;

        run.enter(SyncPhase::Merging);
        let statement = Statement::Merge(merge);
        let affected = if self.config.transactional_merge {
            let mut tx = Transaction::begin(staging.connection())
                .map_err(|e| run.fail(SyncFailure::Transaction(e)))?;
            match tx.connection().execute(&statement) {
                Ok(affected) => {
                    tx.commit().map_err(|e| run.fail(SyncFailure::Transaction(e)))?;
                    affected
                }
                Err(e) => return Err(run.fail(roll_back(tx, SyncFailure::Statement(e)))),
            }
        } else {
            staging
                .connection()
                .execute(&statement)
                .map_err(|e| run.fail(SyncFailure::Statement(e)))?
        };
        debug!(target, rows_affected = affected, "merge executed");

        run.enter(SyncPhase::CleaningUp);
        staging.release().map_err(|e| run.fail(SyncFailure::Cleanup(e)))?;

        Ok(Outcome {
            staging_table: Some(staging_name),
            rows_transferred: transferred,
            rows_affected: affected,
        })
    }

    fn staging_name(&self, target: &str) -> String {
        let name = self.config.staging_name(target);
        if self.config.unique_staging_names {
            format!("{name}_{}", Uuid::new_v4().simple())
        } else {
            name
        }
    }

    fn table_lock(&self, table: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.table_locks
                .lock()
                .entry(table.to_ascii_lowercase())
                .or_default(),
        )
    }

    fn set_phase(&self, phase: SyncPhase) {
        *self.phase.write() = phase;
    }

    fn record_success(&self, report: &SyncReport) {
        let mut stats = self.stats.write();
        stats.calls_succeeded += 1;
        stats.rows_materialized += report.rows_materialized;
        stats.rows_transferred += report.rows_transferred;
        stats.rows_affected += report.rows_affected;
        stats.last_duration = Some(report.duration);
    }

    fn record_failure(&self, error: &SyncError) {
        let mut stats = self.stats.write();
        stats.calls_failed += 1;
        stats.last_error = Some(error.report());
    }
}

/// What a strategy did.
struct Outcome {
    staging_table: Option<String>,
    rows_transferred: u64,
    rows_affected: u64,
}

/// Bookkeeping for one call.
struct Run<'e> {
    engine: &'e SyncEngine,
    mode: SyncMode,
    record_type: &'static str,
    table: Option<String>,
    phase: SyncPhase,
}

impl<'e> Run<'e> {
    fn start(engine: &'e SyncEngine, mode: SyncMode, record_type: &'static str) -> Self {
        engine.set_phase(SyncPhase::Resolving);
        Self {
            engine,
            mode,
            record_type,
            table: None,
            phase: SyncPhase::Resolving,
        }
    }

    fn enter(&mut self, next: SyncPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid phase transition {:?} -> {next:?}",
            self.phase
        );
        self.phase = next;
        self.engine.set_phase(next);
        debug!(mode = %self.mode, table = ?self.table, phase = ?next, "sync phase");
    }

    /// Wraps `cause` with the call context and records the failure.
    fn fail(&self, cause: impl Into<SyncFailure>) -> SyncError {
        let error = SyncError::new(
            self.mode,
            self.record_type,
            self.table.clone(),
            self.phase,
            cause.into(),
        );
        self.engine.set_phase(SyncPhase::Failed);
        self.engine.record_failure(&error);
        warn!(
            mode = %self.mode,
            table = ?self.table,
            phase = ?self.phase,
            error = %error.report(),
            "bulk sync failed"
        );
        error
    }
}

fn delete_and_write<C: Connection + ?Sized>(
    conn: &mut C,
    table: &str,
    buffer: &TransferBuffer,
    writer: &TransferWriter,
    mapping: &ColumnMapping,
) -> Result<(u64, u64), SyncFailure> {
    let deleted = conn
        .execute(&Statement::delete_all(table))
        .map_err(SyncFailure::Statement)?;
    let written = writer.write(conn, buffer, table, mapping)?;
    Ok((deleted, written))
}

/// Rolls `tx` back after `cause`; a failing rollback is folded into the
/// returned failure.
fn roll_back<C: Connection + ?Sized>(tx: Transaction<'_, C>, cause: SyncFailure) -> SyncFailure {
    match tx.rollback() {
        Ok(()) => cause,
        Err(rollback) => SyncFailure::Rollback {
            cause: Box::new(cause),
            rollback,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::BulkWrite;
    use crate::error::{DbError, DbResult, SyncErrorKind};
    use crate::memory::{FailPoint, LogEntry, MemoryConnection, MemoryDatabase, TableDefinition};
    use crate::schema::{resolve, Column, EntityMapping};
    use crate::statement::StatementKind;
    use crate::value::{SqlType, Value};
    use std::time::Duration;

    #[derive(Clone)]
    struct Item {
        id: i32,
        name: &'static str,
    }

    impl Record for Item {
        fn mapping() -> EntityMapping<Self> {
            EntityMapping::new("Items")
                .column(Column::new("ID", SqlType::Int, |i: &Item| i.id.into()).primary_key())
                .column(Column::new("Name", SqlType::NVarChar(Some(20)), |i: &Item| i.name.into()))
        }
    }

    fn item(id: i32, name: &'static str) -> Item {
        Item { id, name }
    }

    fn row(id: i64, name: &str) -> Vec<Value> {
        vec![Value::Int(id), Value::from(name)]
    }

    fn database(rows: Vec<Vec<Value>>) -> MemoryDatabase {
        let db = MemoryDatabase::new();
        let schema = resolve::<Item>().unwrap();
        db.create_table(TableDefinition::from_schema(schema.table_schema())).unwrap();
        db.insert_rows("Items", rows).unwrap();
        db
    }

    fn sorted(db: &MemoryDatabase) -> Vec<Vec<Value>> {
        let mut rows = db.rows("Items").unwrap();
        rows.sort_by_key(|r| r[0].as_int());
        rows
    }

    #[test]
    fn upsert_with_delete_reports_counts() {
        let db = database(vec![row(2, "Old"), row(3, "C")]);
        let engine = SyncEngine::default();

        let report = engine
            .sync(&mut db.connect(), &[item(1, "A"), item(2, "B")], SyncMode::UpsertWithDelete)
            .unwrap();

        assert_eq!(sorted(&db), [row(1, "A"), row(2, "B")]);
        assert_eq!(report.table, "Items");
        assert_eq!(report.staging_table.as_deref(), Some("Items_temp"));
        assert_eq!(report.rows_materialized, 2);
        assert_eq!(report.rows_transferred, 2);
        assert_eq!(report.rows_affected, 3);
        assert_eq!(engine.phase(), SyncPhase::Done);
        assert!(!db.table_exists("Items_temp"));
    }

    #[test]
    fn replace_all_runs_in_one_transaction() {
        let db = database(vec![row(9, "Z")]);
        let engine = SyncEngine::default();

        let report = engine
            .sync(&mut db.connect(), &[item(1, "A")], SyncMode::ReplaceAll)
            .unwrap();

        assert_eq!(sorted(&db), [row(1, "A")]);
        assert_eq!(report.staging_table, None);
        assert_eq!(report.rows_affected, 2);
        assert_eq!(
            db.log(),
            [
                LogEntry::Begin,
                LogEntry::Statement("DELETE FROM Items".into()),
                LogEntry::BulkWrite {
                    destination: "Items".into(),
                    rows: 1
                },
                LogEntry::Commit,
            ]
        );
    }

    #[test]
    fn replace_all_failure_rolls_back() {
        let db = database(vec![row(9, "Z")]);
        db.fail_next(FailPoint::BulkWrite, DbError::connectivity("reset"));
        let engine = SyncEngine::default();

        let err = engine
            .sync(&mut db.connect(), &[item(1, "A")], SyncMode::ReplaceAll)
            .unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::Transfer);
        assert_eq!(err.phase(), SyncPhase::Transferring);
        assert_eq!(sorted(&db), [row(9, "Z")]);
        assert_eq!(db.log().last(), Some(&LogEntry::Rollback));
        assert_eq!(engine.phase(), SyncPhase::Failed);
    }

    #[test]
    fn failed_rollback_is_reported_with_cause() {
        let db = database(vec![]);
        db.fail_next(
            FailPoint::Statement(StatementKind::DeleteAll),
            DbError::timeout("delete"),
        );
        db.fail_next(FailPoint::Rollback, DbError::connectivity("gone"));

        let err = SyncEngine::default()
            .sync(&mut db.connect(), &[item(1, "A")], SyncMode::ReplaceAll)
            .unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::Transaction);
        match err.failure() {
            SyncFailure::Rollback { cause, rollback } => {
                assert!(matches!(**cause, SyncFailure::Statement(_)));
                assert_eq!(rollback.message(), "gone");
            }
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn merge_failure_still_drops_staging() {
        let db = database(vec![row(1, "A")]);
        db.fail_next(FailPoint::Statement(StatementKind::Merge), DbError::timeout("merge"));

        let err = SyncEngine::default()
            .sync(&mut db.connect(), &[item(1, "B")], SyncMode::UpsertNoDelete)
            .unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::Database);
        assert_eq!(err.phase(), SyncPhase::Merging);
        assert!(!db.table_exists("Items_temp"));
        assert_eq!(sorted(&db), [row(1, "A")]);
        assert!(db.statement_log().last().unwrap().starts_with("IF OBJECT_ID('Items_temp'"));
    }

    #[test]
    fn transactional_merge_rolls_back_before_drop() {
        let db = database(vec![row(1, "A")]);
        db.fail_next(FailPoint::Statement(StatementKind::Merge), DbError::timeout("merge"));
        let engine = SyncEngine::new(SyncConfig::new().with_transactional_merge(true));

        engine
            .sync(&mut db.connect(), &[item(1, "B")], SyncMode::UpsertNoDelete)
            .unwrap_err();

        let log = db.log();
        let rollback = log.iter().position(|e| *e == LogEntry::Rollback).unwrap();
        assert!(matches!(
            log.last(),
            Some(LogEntry::Statement(sql)) if sql.starts_with("IF OBJECT_ID")
        ));
        assert!(rollback < log.len() - 1);
    }

    #[test]
    fn cleanup_failure_after_merge_is_an_error() {
        let db = database(vec![]);
        db.fail_nth(
            FailPoint::Statement(StatementKind::DropTableIfExists),
            1,
            DbError::connectivity("lost"),
        );

        let err = SyncEngine::default()
            .sync(&mut db.connect(), &[item(1, "A")], SyncMode::UpsertNoDelete)
            .unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::Cleanup);
        assert_eq!(err.phase(), SyncPhase::CleaningUp);
        assert_eq!(sorted(&db), [row(1, "A")]);
    }

    #[test]
    fn unique_staging_names() {
        let db = database(vec![]);
        let engine = SyncEngine::new(SyncConfig::new().with_unique_staging_names(true));

        let report = engine
            .sync(&mut db.connect(), &[item(1, "A")], SyncMode::UpsertNoDelete)
            .unwrap();

        let staging = report.staging_table.unwrap();
        assert!(staging.starts_with("Items_temp_"));
        assert_eq!(staging.len(), "Items_temp_".len() + 32);
        assert_eq!(db.table_names(), ["Items"]);
    }

    /// Records the timeout in effect at every statement.
    struct TimeoutWatch {
        inner: MemoryConnection,
        seen: Vec<Option<Duration>>,
    }

    impl Connection for TimeoutWatch {
        fn execute(&mut self, statement: &Statement) -> DbResult<u64> {
            self.seen.push(self.inner.statement_timeout());
            self.inner.execute(statement)
        }

        fn begin_transaction(&mut self) -> DbResult<()> {
            self.inner.begin_transaction()
        }

        fn commit_transaction(&mut self) -> DbResult<()> {
            self.inner.commit_transaction()
        }

        fn rollback_transaction(&mut self) -> DbResult<()> {
            self.inner.rollback_transaction()
        }

        fn bulk_write(&mut self, request: &BulkWrite<'_>) -> DbResult<u64> {
            self.seen.push(self.inner.statement_timeout());
            self.inner.bulk_write(request)
        }

        fn set_statement_timeout(&mut self, timeout: Option<Duration>) -> DbResult<()> {
            self.inner.set_statement_timeout(timeout)
        }

        fn statement_timeout(&self) -> Option<Duration> {
            self.inner.statement_timeout()
        }
    }

    #[test]
    fn statement_timeout_applies_during_the_call_only() {
        let db = database(vec![]);
        let engine =
            SyncEngine::new(SyncConfig::new().with_statement_timeout(Duration::from_secs(3)));
        let mut conn = TimeoutWatch {
            inner: db.connect(),
            seen: Vec::new(),
        };
        conn.set_statement_timeout(Some(Duration::from_secs(60))).unwrap();

        engine
            .sync(&mut conn, &[item(1, "A")], SyncMode::UpsertNoDelete)
            .unwrap();

        assert_eq!(conn.seen.len(), 5);
        assert!(conn.seen.iter().all(|t| *t == Some(Duration::from_secs(3))));
        assert_eq!(conn.statement_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn statement_timeout_is_restored_after_failure() {
        let db = database(vec![]);
        let engine =
            SyncEngine::new(SyncConfig::new().with_statement_timeout(Duration::from_secs(3)));
        let mut conn = db.connect();
        db.fail_next(FailPoint::BulkWrite, DbError::timeout("bulk write exceeded 3s"));

        engine
            .sync(&mut conn, &[item(1, "A")], SyncMode::ReplaceAll)
            .unwrap_err();

        assert_eq!(conn.statement_timeout(), None);
    }

    #[test]
    fn stats_accumulate() {
        let db = database(vec![]);
        let engine = SyncEngine::default();
        let mut conn = db.connect();

        engine.sync(&mut conn, &[item(1, "A"), item(2, "B")], SyncMode::UpsertNoDelete).unwrap();
        engine.sync_records(&mut conn, vec![item(3, "C")], SyncMode::UpsertNoDelete).unwrap();
        db.fail_next(FailPoint::BulkWrite, DbError::connectivity("reset"));
        engine.sync(&mut conn, &[item(4, "D")], SyncMode::UpsertNoDelete).unwrap_err();

        let stats = engine.stats();
        assert_eq!(stats.calls_succeeded, 2);
        assert_eq!(stats.calls_failed, 1);
        assert_eq!(stats.rows_transferred, 3);
        assert!(stats.last_error.unwrap().contains("transferring rows"));
        assert_eq!(engine.resolver().cached_types(), 1);
    }

    #[test]
    fn preview_lists_statements() {
        let engine = SyncEngine::default();
        let statements: Vec<String> = engine
            .preview::<Item>(SyncMode::DeleteMatching)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            statements,
            [
                "IF OBJECT_ID('Items_temp','U') IS NOT NULL DROP TABLE Items_temp",
                "SELECT TOP(0) * INTO Items_temp FROM Items",
                "MERGE Items AS TARGET USING Items_temp AS SOURCE ON TARGET.[ID]=SOURCE.[ID]\n\
                 WHEN MATCHED THEN DELETE;",
                "IF OBJECT_ID('Items_temp','U') IS NOT NULL DROP TABLE Items_temp",
            ]
        );
        assert_eq!(
            engine.preview::<Item>(SyncMode::ReplaceAll).unwrap(),
            [Statement::delete_all("Items")]
        );
    }
}
