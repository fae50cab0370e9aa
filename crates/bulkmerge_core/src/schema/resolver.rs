//! Schema resolution and the per-type schema cache.

use crate::error::{SchemaResolutionError, SchemaResult};
use crate::schema::mapping::{Property, ReadForeignKey, Record};
use crate::schema::table::{ColumnDescriptor, TableSchema};
use crate::value::Value;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// How a buffer column is read from a record.
pub(crate) enum ColumnAccessor<T> {
    Scalar(fn(&T) -> Value),
    ForeignKey {
        property: String,
        reader: Box<dyn ReadForeignKey<T> + Send + Sync>,
    },
}

impl<T> ColumnAccessor<T> {
    /// Reads the column value; `None` means an empty navigation.
    pub(crate) fn read(&self, record: &T) -> Option<Value> {
        match self {
            ColumnAccessor::Scalar(get) => Some(get(record)),
            ColumnAccessor::ForeignKey { reader, .. } => reader.read(record),
        }
    }
}

/// A table schema together with the accessors that fill its columns.
///
/// Accessors are index-aligned with [`TableSchema::columns`].
pub struct ResolvedSchema<T> {
    schema: TableSchema,
    pub(crate) accessors: Vec<ColumnAccessor<T>>,
}

impl<T> ResolvedSchema<T> {
    /// Returns the table schema.
    pub fn table_schema(&self) -> &TableSchema {
        &self.schema
    }
}

impl<T> std::fmt::Debug for ResolvedSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Resolves `T`'s mapping into a table schema.
///
/// Navigation properties without a foreign key are dropped. Foreign-key
/// columns take the type of the referenced record's primary key. Fails when
/// the mapping has no table, no columns, no primary key or a repeated
/// column name. No database is touched.
pub fn resolve<T: Record>() -> SchemaResult<ResolvedSchema<T>> {
    let record_type = type_name::<T>();
    let mapping = T::mapping();

    if mapping.table.trim().is_empty() {
        return Err(SchemaResolutionError::missing_table(record_type));
    }

    let mut columns = Vec::with_capacity(mapping.properties.len());
    let mut accessors = Vec::with_capacity(mapping.properties.len());

    for property in mapping.properties {
        match property {
            Property::Scalar(column) => {
                let mut descriptor = ColumnDescriptor::new(column.name, column.sql_type);
                descriptor.is_primary_key = column.primary_key;
                descriptor.is_identity = column.identity;
                descriptor.is_nullable = column.nullable;
                columns.push(descriptor);
                accessors.push(ColumnAccessor::Scalar(column.get));
            }
            Property::Reference(reference) => {
                let Some(column_name) = reference.column else {
                    debug!(
                        record_type,
                        property = %reference.property,
                        "skipping navigation without foreign key"
                    );
                    continue;
                };
                let resolved = reference.target.resolve(&reference.property)?;
                let mut descriptor =
                    ColumnDescriptor::new(column_name, resolved.sql_type).foreign_key();
                descriptor.is_primary_key = reference.primary_key;
                descriptor.is_nullable = reference.nullable;
                columns.push(descriptor);
                accessors.push(ColumnAccessor::ForeignKey {
                    property: reference.property,
                    reader: resolved.reader,
                });
            }
        }
    }

    if columns.is_empty() {
        return Err(SchemaResolutionError::NoColumns { record_type });
    }

    let mut seen = HashSet::with_capacity(columns.len());
    for column in &columns {
        if !seen.insert(column.name.to_ascii_lowercase()) {
            return Err(SchemaResolutionError::DuplicateColumn {
                record_type,
                column: column.name.clone(),
            });
        }
    }

    let schema = TableSchema::new(mapping.table, columns);
    if !schema.has_primary_key() {
        return Err(SchemaResolutionError::missing_primary_key(record_type));
    }

    Ok(ResolvedSchema { schema, accessors })
}

/// Resolves record types once and hands out the cached result afterwards.
#[derive(Default)]
pub struct SchemaResolver {
    cache: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl SchemaResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resolved schema for `T`, resolving it on first use.
    ///
    /// Failures are not cached; a type that fails keeps failing the same way.
    pub fn resolve<T: Record>(&self) -> SchemaResult<Arc<ResolvedSchema<T>>> {
        let key = TypeId::of::<T>();
        if let Some(hit) = self.cache.read().get(&key).cloned() {
            if let Ok(schema) = hit.downcast::<ResolvedSchema<T>>() {
                return Ok(schema);
            }
        }

        let resolved = Arc::new(resolve::<T>()?);
        debug!(
            record_type = type_name::<T>(),
            table = resolved.schema.table_name(),
            columns = resolved.schema.columns().len(),
            "resolved record schema"
        );
        self.cache
            .write()
            .insert(key, Arc::clone(&resolved) as Arc<dyn Any + Send + Sync>);
        Ok(resolved)
    }

    /// Number of cached types.
    pub fn cached_types(&self) -> usize {
        self.cache.read().len()
    }
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("cached_types", &self.cached_types())
            .finish()
    }
}
