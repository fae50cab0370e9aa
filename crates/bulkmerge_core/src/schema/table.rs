//! Column descriptors and table schemas.

use crate::value::SqlType;

/// One column of a resolved table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name in the table.
    pub name: String,
    /// SQL column type.
    pub sql_type: SqlType,
    /// Part of the primary key.
    pub is_primary_key: bool,
    /// Holds the key of a related record.
    pub is_foreign_key: bool,
    /// Generated by the database.
    pub is_identity: bool,
    /// Derived from a navigation property rather than a scalar field.
    pub is_navigation: bool,
    /// Accepts `NULL`.
    pub is_nullable: bool,
}

impl ColumnDescriptor {
    /// Creates a plain, non-nullable scalar column.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            is_primary_key: false,
            is_foreign_key: false,
            is_identity: false,
            is_navigation: false,
            is_nullable: false,
        }
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Marks the column as database-generated.
    #[must_use]
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// Marks the column as a foreign key derived from a navigation property.
    #[must_use]
    pub fn foreign_key(mut self) -> Self {
        self.is_foreign_key = true;
        self.is_navigation = true;
        self
    }
}

/// The table a record type maps to.
///
/// Column order is stable and is the column order of every transfer buffer
/// built for this schema. Schemas produced by the resolver always have at
/// least one key column; hand-built schemas are not checked, so consumers
/// that need a key (the merge builder) verify it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table_name: String,
    columns: Vec<ColumnDescriptor>,
    primary_key: Vec<usize>,
}

impl TableSchema {
    /// Creates a schema; key columns are taken from the descriptors' flags,
    /// in column order.
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        let primary_key = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key)
            .map(|(i, _)| i)
            .collect();

        Self {
            table_name: table_name.into(),
            columns,
            primary_key,
        }
    }

    /// Returns the target table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns all columns in transfer order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the primary key columns in column order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.primary_key.iter().map(|&i| &self.columns[i])
    }

    /// Returns true if at least one column is flagged as key.
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in transfer order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
