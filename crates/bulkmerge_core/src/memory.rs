//! In-memory reference database.
//!
//! [`MemoryDatabase`] implements [`Connection`] with SQL Server semantics for
//! every statement the engine emits. It backs the unit and integration tests,
//! the benchmarks and the demo binary.
//!
//! # Semantics
//!
//! - Table names are matched case-insensitively; surrounding brackets are
//!   ignored.
//! - `SELECT TOP(0) * INTO` copies columns, nullability and identity but no
//!   primary key.
//! - Primary-key columns are never nullable and must stay unique.
//! - A merge is computed in full and then applied, so a failing merge leaves
//!   the target unchanged. `NULL` keys never match, and a target row matched
//!   by more than one source row is an error.
//! - Transactions snapshot every table they touch and restore the snapshots
//!   on rollback.
//! - `Raw` statements are rejected as unsupported.

use crate::connection::{BulkWrite, Connection};
use crate::error::{DbError, DbErrorKind, DbResult};
use crate::merge::MergeStatement;
use crate::schema::TableSchema;
use crate::statement::{Statement, StatementKind};
use crate::value::{SqlType, Value};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// A column of an in-memory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryColumn {
    /// Column name.
    pub name: String,
    /// Column type.
    pub sql_type: SqlType,
    /// Accepts `NULL`.
    pub nullable: bool,
    /// Generated on insert.
    pub identity: bool,
}

impl MemoryColumn {
    /// Creates a non-nullable column.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: false,
            identity: false,
        }
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as an identity column.
    #[must_use]
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }
}

/// Definition used to create an in-memory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    name: String,
    columns: Vec<MemoryColumn>,
    primary_key: Vec<String>,
}

impl TableDefinition {
    /// Starts a definition for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Derives a definition from a resolved schema, primary key included.
    pub fn from_schema(schema: &TableSchema) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|c| MemoryColumn {
                name: c.name.clone(),
                sql_type: c.sql_type,
                nullable: c.is_nullable,
                identity: c.is_identity,
            })
            .collect();
        Self {
            name: schema.table_name().to_owned(),
            columns,
            primary_key: schema.primary_key_columns().map(|c| c.name.clone()).collect(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: MemoryColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key columns.
    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Before a statement of this kind executes.
    Statement(StatementKind),
    /// Before a bulk write is applied.
    BulkWrite,
    /// On begin.
    Begin,
    /// On commit. The transaction is rolled back.
    Commit,
    /// On rollback. The changes are still discarded.
    Rollback,
}

/// One call recorded by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// SQL text of an executed statement.
    Statement(String),
    /// A bulk write.
    BulkWrite {
        /// Destination table.
        destination: String,
        /// Rows in the batch.
        rows: usize,
    },
    /// Transaction begin.
    Begin,
    /// Transaction commit.
    Commit,
    /// Transaction rollback.
    Rollback,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Statement(sql) => f.write_str(sql),
            LogEntry::BulkWrite { destination, rows } => {
                write!(f, "-- bulk write {rows} rows into {destination}")
            }
            LogEntry::Begin => f.write_str("BEGIN TRANSACTION"),
            LogEntry::Commit => f.write_str("COMMIT TRANSACTION"),
            LogEntry::Rollback => f.write_str("ROLLBACK TRANSACTION"),
        }
    }
}

#[derive(Debug)]
struct Fault {
    point: FailPoint,
    skip: usize,
    error: DbError,
}

#[derive(Debug, Default)]
struct Shared {
    catalog: RwLock<Catalog>,
    log: Mutex<Vec<LogEntry>>,
    faults: Mutex<Vec<Fault>>,
}

/// A shareable in-memory database.
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    shared: Arc<Shared>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table.
    pub fn create_table(&self, definition: TableDefinition) -> DbResult<()> {
        let table = Table::from_definition(definition)?;
        let mut catalog = self.shared.catalog.write();
        let key = table_key(&table.name);
        if catalog.tables.contains_key(&key) {
            return Err(already_exists(&table.name));
        }
        catalog.tables.insert(key, table);
        Ok(())
    }

    /// Inserts full-width rows, bypassing the log and failure injection.
    ///
    /// Identity values present in the rows are kept; `NULL` identity values
    /// are generated.
    pub fn insert_rows(&self, table: &str, rows: Vec<Vec<Value>>) -> DbResult<u64> {
        let mut catalog = self.shared.catalog.write();
        let table = catalog.table_mut(table)?;
        if let Some(row) = rows.iter().find(|r| r.len() != table.columns.len()) {
            return Err(DbError::new(
                DbErrorKind::Other,
                format!(
                    "row has {} values but table '{}' has {} columns",
                    row.len(),
                    table.name,
                    table.columns.len()
                ),
            ));
        }
        table.append(rows, true)
    }

    /// Returns true if `table` exists.
    pub fn table_exists(&self, table: &str) -> bool {
        self.shared.catalog.read().tables.contains_key(&table_key(table))
    }

    /// Returns all table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .shared
            .catalog
            .read()
            .tables
            .values()
            .map(|t| t.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Returns a copy of the rows of `table`, in storage order.
    pub fn rows(&self, table: &str) -> Option<Vec<Vec<Value>>> {
        self.shared
            .catalog
            .read()
            .tables
            .get(&table_key(table))
            .map(|t| t.rows.clone())
    }

    /// Returns the column names of `table`.
    pub fn column_names(&self, table: &str) -> Option<Vec<String>> {
        self.shared
            .catalog
            .read()
            .tables
            .get(&table_key(table))
            .map(|t| t.columns.iter().map(|c| c.name.clone()).collect())
    }

    /// Returns the primary key column names of `table`.
    pub fn primary_key(&self, table: &str) -> Option<Vec<String>> {
        self.shared
            .catalog
            .read()
            .tables
            .get(&table_key(table))
            .map(|t| t.primary_key.iter().map(|&i| t.columns[i].name.clone()).collect())
    }

    /// Returns the row count of `table`.
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.shared
            .catalog
            .read()
            .tables
            .get(&table_key(table))
            .map(|t| t.rows.len())
    }

    /// Returns every call recorded so far, including calls that failed.
    pub fn log(&self) -> Vec<LogEntry> {
        self.shared.log.lock().clone()
    }

    /// Returns the SQL text of every statement attempted so far.
    pub fn statement_log(&self) -> Vec<String> {
        self.shared
            .log
            .lock()
            .iter()
            .filter_map(|e| match e {
                LogEntry::Statement(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clears the log.
    pub fn clear_log(&self) {
        self.shared.log.lock().clear();
    }

    /// Makes the next call at `point` fail with `error`.
    pub fn fail_next(&self, point: FailPoint, error: DbError) {
        self.fail_nth(point, 0, error);
    }

    /// Lets `skip` calls at `point` pass, then fails the next one.
    pub fn fail_nth(&self, point: FailPoint, skip: usize, error: DbError) {
        self.shared.faults.lock().push(Fault { point, skip, error });
    }

    /// Removes all pending injected failures.
    pub fn clear_failures(&self) {
        self.shared.faults.lock().clear();
    }

    /// Opens a connection.
    pub fn connect(&self) -> MemoryConnection {
        MemoryConnection {
            db: self.clone(),
            saved: None,
            timeout: None,
        }
    }

    fn record(&self, entry: LogEntry) {
        trace!(entry = %entry, "memory database call");
        self.shared.log.lock().push(entry);
    }

    fn take_fault(&self, point: FailPoint) -> Option<DbError> {
        let mut faults = self.shared.faults.lock();
        let index = faults.iter().position(|f| f.point == point)?;
        if faults[index].skip > 0 {
            faults[index].skip -= 1;
            return None;
        }
        Some(faults.remove(index).error)
    }
}

type Snapshot = HashMap<String, Option<Table>>;

/// A connection to a [`MemoryDatabase`].
///
/// Dropping the connection with a transaction open rolls it back.
#[derive(Debug)]
pub struct MemoryConnection {
    db: MemoryDatabase,
    saved: Option<Snapshot>,
    timeout: Option<Duration>,
}

impl MemoryConnection {
    /// Returns true while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.saved.is_some()
    }

    /// Returns the database this connection belongs to.
    pub fn database(&self) -> &MemoryDatabase {
        &self.db
    }
}

impl Connection for MemoryConnection {
    fn execute(&mut self, statement: &Statement) -> DbResult<u64> {
        self.db.record(LogEntry::Statement(statement.to_string()));
        if let Some(error) = self.db.take_fault(FailPoint::Statement(statement.kind())) {
            return Err(error);
        }

        let mut catalog = self.db.shared.catalog.write();
        if let Some(table) = written_table(statement) {
            remember(&mut self.saved, &catalog, table);
        }
        catalog.execute(statement)
    }

    fn begin_transaction(&mut self) -> DbResult<()> {
        self.db.record(LogEntry::Begin);
        if let Some(error) = self.db.take_fault(FailPoint::Begin) {
            return Err(error);
        }
        if self.saved.is_some() {
            return Err(DbError::new(DbErrorKind::Other, "a transaction is already open"));
        }
        self.saved = Some(Snapshot::new());
        Ok(())
    }

    fn commit_transaction(&mut self) -> DbResult<()> {
        self.db.record(LogEntry::Commit);
        let saved = self.saved.take().ok_or_else(no_transaction)?;
        if let Some(error) = self.db.take_fault(FailPoint::Commit) {
            restore(&mut self.db.shared.catalog.write(), saved);
            return Err(error);
        }
        Ok(())
    }

    fn rollback_transaction(&mut self) -> DbResult<()> {
        self.db.record(LogEntry::Rollback);
        let saved = self.saved.take().ok_or_else(no_transaction)?;
        restore(&mut self.db.shared.catalog.write(), saved);
        match self.db.take_fault(FailPoint::Rollback) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn bulk_write(&mut self, request: &BulkWrite<'_>) -> DbResult<u64> {
        self.db.record(LogEntry::BulkWrite {
            destination: request.destination.to_owned(),
            rows: request.rows.len(),
        });
        if let Some(error) = self.db.take_fault(FailPoint::BulkWrite) {
            return Err(error);
        }

        let mut catalog = self.db.shared.catalog.write();
        remember(&mut self.saved, &catalog, request.destination);
        catalog.bulk_write(request)
    }

    fn set_statement_timeout(&mut self, timeout: Option<Duration>) -> DbResult<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn statement_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            restore(&mut self.db.shared.catalog.write(), saved);
        }
    }
}

fn written_table(statement: &Statement) -> Option<&str> {
    match statement {
        Statement::DropTableIfExists { table } | Statement::DeleteAll { table } => Some(table),
        Statement::CopyStructure { destination, .. } => Some(destination),
        Statement::Merge(merge) => Some(&merge.target),
        Statement::Raw(_) => None,
    }
}

/// Saves the pre-transaction state of `table` the first time it is touched.
fn remember(saved: &mut Option<Snapshot>, catalog: &Catalog, table: &str) {
    if let Some(saved) = saved {
        let key = table_key(table);
        if !saved.contains_key(&key) {
            let prior = catalog.tables.get(&key).cloned();
            saved.insert(key, prior);
        }
    }
}

fn restore(catalog: &mut Catalog, saved: Snapshot) {
    for (key, prior) in saved {
        match prior {
            Some(table) => {
                catalog.tables.insert(key, table);
            }
            None => {
                catalog.tables.remove(&key);
            }
        }
    }
}

fn no_transaction() -> DbError {
    DbError::new(DbErrorKind::Other, "no transaction is open")
}

fn already_exists(name: &str) -> DbError {
    DbError::new(
        DbErrorKind::Other,
        format!("There is already an object named '{name}' in the database."),
    )
}

fn table_key(name: &str) -> String {
    name.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, Default)]
struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    fn table(&self, name: &str) -> DbResult<&Table> {
        self.tables
            .get(&table_key(name))
            .ok_or_else(|| DbError::object_not_found(format!("Invalid object name '{name}'.")))
    }

    fn table_mut(&mut self, name: &str) -> DbResult<&mut Table> {
        self.tables
            .get_mut(&table_key(name))
            .ok_or_else(|| DbError::object_not_found(format!("Invalid object name '{name}'.")))
    }

    fn execute(&mut self, statement: &Statement) -> DbResult<u64> {
        match statement {
            Statement::DropTableIfExists { table } => {
                self.tables.remove(&table_key(table));
                Ok(0)
            }
            Statement::CopyStructure {
                source,
                destination,
            } => {
                let source = self.table(source)?;
                let key = table_key(destination);
                if self.tables.contains_key(&key) {
                    return Err(already_exists(destination));
                }
                let copy = Table {
                    name: destination.clone(),
                    columns: source.columns.clone(),
                    primary_key: Vec::new(),
                    rows: Vec::new(),
                    next_identity: 1,
                };
                self.tables.insert(key, copy);
                Ok(0)
            }
            Statement::DeleteAll { table } => {
                let table = self.table_mut(table)?;
                let deleted = table.rows.len() as u64;
                table.rows.clear();
                Ok(deleted)
            }
            Statement::Merge(merge) => self.merge(merge),
            Statement::Raw(_) => Err(DbError::unsupported(
                "raw SQL is not supported by the in-memory database",
            )),
        }
    }

    fn bulk_write(&mut self, request: &BulkWrite<'_>) -> DbResult<u64> {
        let table = self.table_mut(request.destination)?;

        let mut targets = Vec::with_capacity(request.mapping.pairs().len());
        for pair in request.mapping.pairs() {
            let source = request
                .source_columns
                .iter()
                .position(|c| *c == pair.source)
                .ok_or_else(|| {
                    DbError::new(
                        DbErrorKind::Other,
                        format!(
                            "The given ColumnMapping does not match up with any column in the source: {}",
                            pair.source
                        ),
                    )
                })?;
            targets.push((source, table.column_index(&pair.destination)?));
        }

        let width = table.columns.len();
        let rows = request
            .rows
            .iter()
            .map(|row| {
                let mut full = vec![Value::Null; width];
                for &(source, destination) in &targets {
                    full[destination] = row.get(source).cloned().unwrap_or(Value::Null);
                }
                full
            })
            .collect();
        table.append(rows, request.options.keep_identity)
    }

    fn merge(&mut self, merge: &MergeStatement) -> DbResult<u64> {
        let target = self.table(&merge.target)?;
        let source = self.table(&merge.source)?;

        let pair = |names: &[String]| -> DbResult<Vec<(usize, usize)>> {
            names
                .iter()
                .map(|n| -> DbResult<(usize, usize)> {
                    Ok((target.column_index(n)?, source.column_index(n)?))
                })
                .collect()
        };
        let keys = pair(merge.key_columns.as_slice())?;
        let inserts = pair(merge.insert_columns.as_slice())?;
        let updates = pair(merge.update_columns.as_slice())?;
        let clauses = merge.clauses;

        if clauses.insert_unmatched && inserts.iter().any(|&(t, _)| target.columns[t].identity) {
            return Err(DbError::new(
                DbErrorKind::Other,
                format!(
                    "Cannot insert explicit value for identity column in table '{}' when IDENTITY_INSERT is set to OFF.",
                    target.name
                ),
            ));
        }
        if clauses.update_matched {
            if let Some(&(t, _)) = updates.iter().find(|&&(t, _)| target.columns[t].identity) {
                return Err(DbError::new(
                    DbErrorKind::Other,
                    format!("Cannot update identity column '{}'.", target.columns[t].name),
                ));
            }
        }

        let target_keys: Vec<usize> = keys.iter().map(|&(t, _)| t).collect();
        let source_keys: Vec<usize> = keys.iter().map(|&(_, s)| s).collect();

        let mut index: HashMap<RowKey, Vec<usize>> = HashMap::new();
        for (i, row) in target.rows.iter().enumerate() {
            if let Some(key) = RowKey::of(row, &target_keys) {
                index.entry(key).or_default().push(i);
            }
        }

        let matching_clause = clauses.update_matched || clauses.delete_matched;
        let mut matched_by: Vec<Option<usize>> = vec![None; target.rows.len()];
        let mut unmatched = Vec::new();
        for (s, row) in source.rows.iter().enumerate() {
            match RowKey::of(row, &source_keys).and_then(|k| index.get(&k)) {
                Some(hits) => {
                    for &t in hits {
                        if matched_by[t].replace(s).is_some() && matching_clause {
                            return Err(DbError::new(
                                DbErrorKind::Other,
                                "The MERGE statement attempted to UPDATE or DELETE the same row more than once. \
                                 A target row matched more than one source row.",
                            ));
                        }
                    }
                }
                None => unmatched.push(s),
            }
        }

        let (mut inserted, mut updated, mut deleted) = (0u64, 0u64, 0u64);
        let mut rows = Vec::with_capacity(target.rows.len() + unmatched.len());
        for (t, row) in target.rows.iter().enumerate() {
            match matched_by[t] {
                Some(_) if clauses.delete_matched => deleted += 1,
                Some(s) if clauses.update_matched => {
                    let mut row = row.clone();
                    for &(tc, sc) in &updates {
                        row[tc] = source.rows[s][sc].clone();
                    }
                    target.check_row(&row)?;
                    rows.push(row);
                    updated += 1;
                }
                None if clauses.delete_unmatched_by_source => deleted += 1,
                _ => rows.push(row.clone()),
            }
        }

        let mut next_identity = target.next_identity;
        if clauses.insert_unmatched {
            for s in unmatched {
                let mut row = vec![Value::Null; target.columns.len()];
                for &(tc, sc) in &inserts {
                    row[tc] = source.rows[s][sc].clone();
                }
                for (i, column) in target.columns.iter().enumerate() {
                    if column.identity {
                        row[i] = Value::Int(next_identity);
                        next_identity += 1;
                    }
                }
                target.check_row(&row)?;
                rows.push(row);
                inserted += 1;
            }
        }
        target.check_unique(&rows)?;

        trace!(
            target = %merge.target,
            inserted,
            updated,
            deleted,
            "merge applied"
        );
        let target = self.table_mut(&merge.target)?;
        target.rows = rows;
        target.next_identity = next_identity;
        Ok(inserted + updated + deleted)
    }
}

#[derive(Debug, Clone)]
struct Table {
    name: String,
    columns: Vec<MemoryColumn>,
    primary_key: Vec<usize>,
    rows: Vec<Vec<Value>>,
    next_identity: i64,
}

impl Table {
    fn from_definition(definition: TableDefinition) -> DbResult<Self> {
        let mut seen = HashSet::new();
        for column in &definition.columns {
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(DbError::new(
                    DbErrorKind::Other,
                    format!(
                        "Column names in each table must be unique. Column name '{}' in table '{}' is specified more than once.",
                        column.name, definition.name
                    ),
                ));
            }
        }

        let mut table = Table {
            name: definition.name,
            columns: definition.columns,
            primary_key: Vec::new(),
            rows: Vec::new(),
            next_identity: 1,
        };
        for name in &definition.primary_key {
            let index = table.column_index(name)?;
            table.columns[index].nullable = false;
            table.primary_key.push(index);
        }
        Ok(table)
    }

    fn column_index(&self, name: &str) -> DbResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                DbError::object_not_found(format!(
                    "Invalid column name '{name}' in table '{}'.",
                    self.name
                ))
            })
    }

    fn check_row(&self, row: &[Value]) -> DbResult<()> {
        for (column, value) in self.columns.iter().zip(row) {
            if value.is_null() && !column.nullable {
                return Err(DbError::constraint_violation(format!(
                    "Cannot insert the value NULL into column '{}', table '{}'; column does not allow nulls.",
                    column.name, self.name
                )));
            }
            if !value.is_compatible_with(column.sql_type) {
                return Err(DbError::new(
                    DbErrorKind::Other,
                    format!(
                        "The given value {value} of type {} cannot be converted to type {} of column '{}'.",
                        value.type_name(),
                        column.sql_type,
                        column.name
                    ),
                ));
            }
        }
        Ok(())
    }

    fn check_unique<'r>(&self, rows: impl IntoIterator<Item = &'r Vec<Value>>) -> DbResult<()> {
        if self.primary_key.is_empty() {
            return Ok(());
        }
        let mut seen = HashSet::new();
        for row in rows {
            if let Some(key) = RowKey::of(row, &self.primary_key) {
                if let Some(duplicate) = seen.replace(key) {
                    return Err(DbError::constraint_violation(format!(
                        "Violation of PRIMARY KEY constraint on table '{}'. Cannot insert duplicate key. The duplicate key value is ({duplicate}).",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validates and appends full-width rows; nothing is written on error.
    fn append(&mut self, mut rows: Vec<Vec<Value>>, keep_identity: bool) -> DbResult<u64> {
        let mut next_identity = self.next_identity;
        for row in &mut rows {
            for (i, column) in self.columns.iter().enumerate() {
                if !column.identity {
                    continue;
                }
                match row[i].as_int() {
                    Some(n) if keep_identity => {
                        next_identity = next_identity.max(n.saturating_add(1));
                    }
                    _ => {
                        row[i] = Value::Int(next_identity);
                        next_identity += 1;
                    }
                }
            }
            self.check_row(row)?;
        }
        self.check_unique(self.rows.iter().chain(&rows))?;

        let count = rows.len() as u64;
        self.rows.extend(rows);
        self.next_identity = next_identity;
        Ok(count)
    }
}

/// Key values of a row, hashed and compared with floats by bit pattern.
struct RowKey(Vec<Value>);

impl RowKey {
    /// `None` if any key value is `NULL`; such rows never match.
    fn of(row: &[Value], columns: &[usize]) -> Option<Self> {
        columns
            .iter()
            .map(|&i| Some(row[i].clone()).filter(|v| !v.is_null()))
            .collect::<Option<Vec<_>>>()
            .map(RowKey)
    }
}

impl PartialEq for RowKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| match (a, b) {
                (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
                _ => a == b,
            })
    }
}

impl Eq for RowKey {}

impl Hash for RowKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.0 {
            std::mem::discriminant(value).hash(state);
            match value {
                Value::Null => {}
                Value::Bool(b) => b.hash(state),
                Value::Int(n) => n.hash(state),
                Value::Float(x) => x.to_bits().hash(state),
                Value::Decimal(s) | Value::Text(s) => s.hash(state),
                Value::Bytes(b) => b.hash(state),
                Value::Uuid(u) => u.hash(state),
                Value::Date(d) => d.hash(state),
                Value::DateTime(dt) => dt.hash(state),
            }
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&values.join(", "))
    }
}
