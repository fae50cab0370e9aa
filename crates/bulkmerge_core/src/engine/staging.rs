//! Staging table guard.

use crate::connection::Connection;
use crate::error::DbResult;
use crate::statement::Statement;
use tracing::{debug, warn};

/// Owns a staging table for the duration of one call.
///
/// The table is dropped by [`StagingTable::release`] or, if that is never
/// reached, when the guard goes out of scope.
pub(crate) struct StagingTable<'c, C: Connection + ?Sized> {
    conn: &'c mut C,
    name: String,
    armed: bool,
}

impl<'c, C: Connection + ?Sized> StagingTable<'c, C> {
    /// Takes ownership of `name` on `conn`. Nothing is executed yet.
    pub(crate) fn guard(conn: &'c mut C, name: String) -> Self {
        Self {
            conn,
            name,
            armed: true,
        }
    }

    pub(crate) fn connection(&mut self) -> &mut C {
        &mut *self.conn
    }

    /// Drops the staging table and disarms the guard.
    pub(crate) fn release(mut self) -> DbResult<()> {
        self.armed = false;
        self.conn
            .execute(&Statement::drop_table_if_exists(self.name.as_str()))
            .map(|_| ())
    }
}

impl<C: Connection + ?Sized> Drop for StagingTable<'_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.conn.execute(&Statement::drop_table_if_exists(self.name.as_str())) {
            Ok(_) => debug!(staging = %self.name, "staging table dropped after failure"),
            Err(e) => warn!(staging = %self.name, error = %e, "failed to drop staging table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailPoint, MemoryDatabase, MemoryColumn, TableDefinition};
    use crate::error::DbError;
    use crate::statement::StatementKind;
    use crate::value::SqlType;

    fn db_with_staging() -> MemoryDatabase {
        let db = MemoryDatabase::new();
        db.create_table(
            TableDefinition::new("T_temp").column(MemoryColumn::new("ID", SqlType::Int)),
        )
        .unwrap();
        db
    }

    #[test]
    fn drop_removes_table() {
        let db = db_with_staging();
        let mut conn = db.connect();
        {
            let _staging = StagingTable::guard(&mut conn, "T_temp".into());
        }
        assert!(!db.table_exists("T_temp"));
    }

    #[test]
    fn release_drops_once() {
        let db = db_with_staging();
        let mut conn = db.connect();
        StagingTable::guard(&mut conn, "T_temp".into()).release().unwrap();
        assert!(!db.table_exists("T_temp"));
        assert_eq!(db.statement_log().len(), 1);
    }

    #[test]
    fn failed_drop_on_unwind_is_logged_not_raised() {
        let db = db_with_staging();
        db.fail_next(
            FailPoint::Statement(StatementKind::DropTableIfExists),
            DbError::connectivity("lost"),
        );
        let mut conn = db.connect();
        drop(StagingTable::guard(&mut conn, "T_temp".into()));
        assert!(db.table_exists("T_temp"));
    }
}
