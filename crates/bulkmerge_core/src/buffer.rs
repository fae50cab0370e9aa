//! Columnar transfer buffer.

use crate::value::Value;

/// Rows ready to be streamed into a table.
///
/// Every row has exactly one value per column, in column order. A buffer is
/// built fresh for each synchronization call and dropped after the transfer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransferBuffer {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TransferBuffer {
    /// Creates an empty buffer with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates an empty buffer with room for `rows` rows.
    pub fn with_capacity(columns: Vec<String>, rows: usize) -> Self {
        Self {
            columns,
            rows: Vec::with_capacity(rows),
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows in input order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the buffer holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column`, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Gets a single cell.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_by_name() {
        let mut buffer = TransferBuffer::new(vec!["ID".into(), "Name".into()]);
        buffer.push_row(vec![Value::Int(1), Value::from("A")]);
        buffer.push_row(vec![Value::Int(2), Value::Null]);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.get(0, "Name"), Some(&Value::from("A")));
        assert_eq!(buffer.get(1, "Name"), Some(&Value::Null));
        assert_eq!(buffer.get(2, "ID"), None);
        assert_eq!(buffer.get(0, "Missing"), None);
    }

    #[test]
    fn empty_buffer_keeps_columns() {
        let buffer = TransferBuffer::new(vec!["ID".into()]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.columns(), ["ID"]);
    }
}
