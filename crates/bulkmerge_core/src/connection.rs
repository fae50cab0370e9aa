//! Database collaborator abstraction.

use crate::error::DbResult;
use crate::statement::Statement;
use crate::transfer::ColumnMapping;
use crate::value::Value;
use std::time::Duration;
use tracing::warn;

/// A connection to the database holding the target table.
///
/// This trait abstracts the driver, allowing for different implementations
/// (a real SQL Server client, [`crate::MemoryDatabase`] for testing, etc.).
/// Every call is a blocking round trip.
pub trait Connection: Send {
    /// Executes a DDL or DML statement and returns the rows affected.
    fn execute(&mut self, statement: &Statement) -> DbResult<u64>;

    /// Opens a transaction.
    fn begin_transaction(&mut self) -> DbResult<()>;

    /// Commits the open transaction.
    fn commit_transaction(&mut self) -> DbResult<()>;

    /// Rolls back the open transaction.
    fn rollback_transaction(&mut self) -> DbResult<()>;

    /// Streams rows into a table through the bulk-copy path.
    ///
    /// Runs inside the open transaction, if there is one. Returns the number
    /// of rows written.
    fn bulk_write(&mut self, request: &BulkWrite<'_>) -> DbResult<u64>;

    /// Sets the timeout applied to every following call. `None` disables it.
    fn set_statement_timeout(&mut self, timeout: Option<Duration>) -> DbResult<()>;

    /// Returns the timeout currently in effect.
    fn statement_timeout(&self) -> Option<Duration>;
}

/// Options of a single bulk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkWriteOptions {
    /// Take identity values from the rows instead of generating them.
    pub keep_identity: bool,
}

/// One batch handed to [`Connection::bulk_write`].
#[derive(Debug, Clone, Copy)]
pub struct BulkWrite<'a> {
    /// Destination table.
    pub destination: &'a str,
    /// Names of the row columns, in row order.
    pub source_columns: &'a [String],
    /// Source-to-destination column pairs.
    pub mapping: &'a ColumnMapping,
    /// Rows to write.
    pub rows: &'a [Vec<Value>],
    /// Write options.
    pub options: BulkWriteOptions,
}

/// An open transaction.
///
/// Dropping the guard without calling [`Transaction::commit`] rolls the
/// transaction back.
pub struct Transaction<'c, C: Connection + ?Sized> {
    conn: &'c mut C,
    done: bool,
}

impl<'c, C: Connection + ?Sized> Transaction<'c, C> {
    /// Begins a transaction on `conn`.
    pub fn begin(conn: &'c mut C) -> DbResult<Self> {
        conn.begin_transaction()?;
        Ok(Self { conn, done: false })
    }

    /// Returns the connection for work inside the transaction.
    pub fn connection(&mut self) -> &mut C {
        &mut *self.conn
    }

    /// Commits the transaction.
    pub fn commit(mut self) -> DbResult<()> {
        self.done = true;
        self.conn.commit_transaction()
    }

    /// Rolls the transaction back.
    pub fn rollback(mut self) -> DbResult<()> {
        self.done = true;
        self.conn.rollback_transaction()
    }
}

impl<C: Connection + ?Sized> Drop for Transaction<'_, C> {
    fn drop(&mut self) {
        if !self.done {
            if let Err(e) = self.conn.rollback_transaction() {
                warn!(error = %e, "rollback of abandoned transaction failed");
            }
        }
    }
}
