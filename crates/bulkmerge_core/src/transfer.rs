//! Bulk transfer of buffers into tables.

use crate::buffer::TransferBuffer;
use crate::connection::{BulkWrite, BulkWriteOptions, Connection};
use crate::error::{TransferError, TransferResult};
use crate::schema::TableSchema;
use std::collections::HashSet;
use tracing::debug;

/// A buffer column paired with a destination column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair {
    /// Buffer column.
    pub source: String,
    /// Destination column.
    pub destination: String,
}

/// Explicit column-to-column mapping of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    pairs: Vec<ColumnPair>,
}

impl ColumnMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps every column onto the identically named destination column.
    pub fn by_name<S: AsRef<str>>(columns: &[S]) -> Self {
        columns.iter().fold(Self::new(), |m, c| m.add(c.as_ref(), c.as_ref()))
    }

    /// Identity mapping over the schema's columns.
    pub fn for_schema(schema: &TableSchema) -> Self {
        Self::by_name(&schema.column_names())
    }

    /// Adds a pair.
    #[must_use]
    pub fn add(mut self, source: impl Into<String>, destination: impl Into<String>) -> Self {
        self.pairs.push(ColumnPair {
            source: source.into(),
            destination: destination.into(),
        });
        self
    }

    /// Returns the pairs in insertion order.
    pub fn pairs(&self) -> &[ColumnPair] {
        &self.pairs
    }

    /// Looks up the destination of a buffer column.
    pub fn destination_of(&self, source: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.source == source)
            .map(|p| p.destination.as_str())
    }

    /// Checks that every buffer column is mapped exactly once and that the
    /// mapping names nothing else.
    pub fn validate(&self, columns: &[String]) -> TransferResult<()> {
        let mut sources = HashSet::with_capacity(self.pairs.len());
        let mut destinations = HashSet::with_capacity(self.pairs.len());
        for pair in &self.pairs {
            if !sources.insert(pair.source.as_str()) {
                return Err(TransferError::DuplicateMapping {
                    column: pair.source.clone(),
                });
            }
            if !destinations.insert(pair.destination.to_ascii_lowercase()) {
                return Err(TransferError::DuplicateMapping {
                    column: pair.destination.clone(),
                });
            }
            if !columns.contains(&pair.source) {
                return Err(TransferError::UnknownSourceColumn {
                    column: pair.source.clone(),
                });
            }
        }

        match columns.iter().find(|c| !sources.contains(c.as_str())) {
            Some(column) => Err(TransferError::UnmappedColumn {
                column: column.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Transfer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferOptions {
    /// Rows per round trip; `0` sends everything at once.
    pub batch_size: usize,
    /// Supply identity values from the buffer.
    pub keep_identity: bool,
}

impl TransferOptions {
    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, rows: usize) -> Self {
        self.batch_size = rows;
        self
    }

    /// Sets whether identity values are kept.
    #[must_use]
    pub const fn with_keep_identity(mut self, keep: bool) -> Self {
        self.keep_identity = keep;
        self
    }
}

/// Streams transfer buffers through [`Connection::bulk_write`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferWriter {
    options: TransferOptions,
}

impl TransferWriter {
    /// Creates a writer with the given options.
    pub fn new(options: TransferOptions) -> Self {
        Self { options }
    }

    /// Returns the options.
    pub fn options(&self) -> TransferOptions {
        self.options
    }

    /// Writes `buffer` into `destination` and returns the rows written.
    ///
    /// The mapping is validated before any I/O. Rows go out in buffer order.
    /// A failing batch is reported with the rows already acknowledged; the
    /// writer never rolls anything back itself.
    pub fn write<C: Connection + ?Sized>(
        &self,
        conn: &mut C,
        buffer: &TransferBuffer,
        destination: &str,
        mapping: &ColumnMapping,
    ) -> TransferResult<u64> {
        mapping.validate(buffer.columns())?;
        if buffer.is_empty() {
            return Ok(0);
        }

        let batch_size = match self.options.batch_size {
            0 => buffer.len(),
            n => n,
        };
        let options = BulkWriteOptions {
            keep_identity: self.options.keep_identity,
        };

        let mut rows_written = 0u64;
        for batch in buffer.rows().chunks(batch_size) {
            let request = BulkWrite {
                destination,
                source_columns: buffer.columns(),
                mapping,
                rows: batch,
                options,
            };
            rows_written += conn
                .bulk_write(&request)
                .map_err(|source| TransferError::Write {
                    destination: destination.to_owned(),
                    rows_written,
                    source,
                })?;
            debug!(destination, rows_written, "bulk batch written");
        }

        Ok(rows_written)
    }
}
