//! Statements sent to the database collaborator.

use crate::merge::MergeStatement;
use std::fmt;

/// A statement the engine asks a [`crate::Connection`] to execute.
///
/// `Display` is the exact SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `IF OBJECT_ID('<table>','U') IS NOT NULL DROP TABLE <table>`
    DropTableIfExists {
        /// Table to drop.
        table: String,
    },
    /// `SELECT TOP(0) * INTO <destination> FROM <source>`
    CopyStructure {
        /// Table whose columns are copied.
        source: String,
        /// Table to create.
        destination: String,
    },
    /// `DELETE FROM <table>`
    DeleteAll {
        /// Table to empty.
        table: String,
    },
    /// A set-based merge.
    Merge(MergeStatement),
    /// Arbitrary SQL text.
    Raw(String),
}

/// Discriminant of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// [`Statement::DropTableIfExists`]
    DropTableIfExists,
    /// [`Statement::CopyStructure`]
    CopyStructure,
    /// [`Statement::DeleteAll`]
    DeleteAll,
    /// [`Statement::Merge`]
    Merge,
    /// [`Statement::Raw`]
    Raw,
}

impl Statement {
    /// Creates a conditional drop.
    pub fn drop_table_if_exists(table: impl Into<String>) -> Self {
        Statement::DropTableIfExists { table: table.into() }
    }

    /// Creates an empty copy of `source` named `destination`.
    pub fn copy_structure(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Statement::CopyStructure {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Creates an unconditional delete.
    pub fn delete_all(table: impl Into<String>) -> Self {
        Statement::DeleteAll { table: table.into() }
    }

    /// Returns the statement kind.
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::DropTableIfExists { .. } => StatementKind::DropTableIfExists,
            Statement::CopyStructure { .. } => StatementKind::CopyStructure,
            Statement::DeleteAll { .. } => StatementKind::DeleteAll,
            Statement::Merge(_) => StatementKind::Merge,
            Statement::Raw(_) => StatementKind::Raw,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::DropTableIfExists { table } => write!(
                f,
                "IF OBJECT_ID('{}','U') IS NOT NULL DROP TABLE {table}",
                table.replace('\'', "''")
            ),
            Statement::CopyStructure {
                source,
                destination,
            } => write!(f, "SELECT TOP(0) * INTO {destination} FROM {source}"),
            Statement::DeleteAll { table } => write!(f, "DELETE FROM {table}"),
            Statement::Merge(merge) => fmt::Display::fmt(merge, f),
            Statement::Raw(sql) => f.write_str(sql),
        }
    }
}

impl From<MergeStatement> for Statement {
    fn from(merge: MergeStatement) -> Self {
        Statement::Merge(merge)
    }
}
