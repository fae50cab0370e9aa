//! Declarative record-to-table mappings.

use crate::error::{SchemaResolutionError, SchemaResult};
use crate::value::{SqlType, Value};
use std::any::type_name;

/// Trait for types that can be bulk-synchronized into a table.
///
/// The mapping is a compile-time checked description of the table: every
/// column carries a plain function that reads the value from a record, so
/// no lookup by name happens while rows are materialized.
///
/// # Example
///
/// ```rust
/// use bulkmerge_core::{Column, EntityMapping, Record, Reference, SqlType};
///
/// struct Department {
///     id: i32,
///     name: String,
/// }
///
/// struct Employee {
///     id: i32,
///     name: String,
///     department: Option<Department>,
/// }
///
/// impl Record for Department {
///     fn mapping() -> EntityMapping<Self> {
///         EntityMapping::new("Departments")
///             .column(Column::new("ID", SqlType::Int, |d: &Department| d.id.into()).primary_key())
///             .column(Column::new("Name", SqlType::NVarChar(Some(100)), |d: &Department| {
///                 d.name.as_str().into()
///             }))
///     }
/// }
///
/// impl Record for Employee {
///     fn mapping() -> EntityMapping<Self> {
///         EntityMapping::new("Employees")
///             .column(Column::new("ID", SqlType::Int, |e: &Employee| e.id.into()).primary_key())
///             .column(Column::new("Name", SqlType::NVarChar(Some(100)), |e: &Employee| {
///                 e.name.as_str().into()
///             }))
///             .reference(
///                 Reference::foreign_key::<Department>(
///                     "Department",
///                     "DepartmentID",
///                     |e: &Employee| e.department.as_ref(),
///                 )
///                 .nullable(),
///             )
///     }
/// }
/// ```
pub trait Record: Sized + 'static {
    /// Describes the table this type maps to.
    fn mapping() -> EntityMapping<Self>;
}

/// The table name and ordered properties of a record type.
pub struct EntityMapping<T> {
    pub(crate) table: String,
    pub(crate) properties: Vec<Property<T>>,
}

pub(crate) enum Property<T> {
    Scalar(Column<T>),
    Reference(Reference<T>),
}

impl<T: 'static> EntityMapping<T> {
    /// Starts a mapping onto `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            properties: Vec::new(),
        }
    }

    /// Appends a scalar column.
    #[must_use]
    pub fn column(mut self, column: Column<T>) -> Self {
        self.properties.push(Property::Scalar(column));
        self
    }

    /// Appends a navigation property.
    #[must_use]
    pub fn reference(mut self, reference: Reference<T>) -> Self {
        self.properties.push(Property::Reference(reference));
        self
    }

    /// Returns the mapped table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// A scalar property stored in its own column.
pub struct Column<T> {
    pub(crate) name: String,
    pub(crate) sql_type: SqlType,
    pub(crate) primary_key: bool,
    pub(crate) identity: bool,
    pub(crate) nullable: bool,
    pub(crate) get: fn(&T) -> Value,
}

impl<T> Column<T> {
    /// Creates a non-nullable column read by `get`.
    pub fn new(name: impl Into<String>, sql_type: SqlType, get: fn(&T) -> Value) -> Self {
        Self {
            name: name.into(),
            sql_type,
            primary_key: false,
            identity: false,
            nullable: false,
            get,
        }
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as database-generated.
    #[must_use]
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A property holding a related record.
///
/// Only foreign-key navigations become columns; the column stores the
/// related record's primary key value.
pub struct Reference<T> {
    pub(crate) property: String,
    pub(crate) column: Option<String>,
    pub(crate) primary_key: bool,
    pub(crate) nullable: bool,
    pub(crate) target: Box<dyn ReferenceTarget<T> + Send + Sync>,
}

impl<T: 'static> Reference<T> {
    /// A navigation backed by the foreign-key column `column`.
    pub fn foreign_key<R: Record>(
        property: impl Into<String>,
        column: impl Into<String>,
        get: fn(&T) -> Option<&R>,
    ) -> Self {
        Self {
            property: property.into(),
            column: Some(column.into()),
            primary_key: false,
            nullable: false,
            target: Box::new(NavigationTo { get }),
        }
    }

    /// A navigation with no foreign key of its own (for example the inverse
    /// side of a relationship). It is never transferred.
    pub fn navigation<R: Record>(property: impl Into<String>, get: fn(&T) -> Option<&R>) -> Self {
        Self {
            property: property.into(),
            column: None,
            primary_key: false,
            nullable: true,
            target: Box::new(NavigationTo { get }),
        }
    }

    /// Allows the navigation to be empty; the column is then `NULL`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the foreign-key column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Returns true if the navigation is backed by a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        self.column.is_some()
    }
}

/// The referenced side of a navigation, resolved on demand so that
/// self-referencing types do not recurse while their mapping is built.
pub(crate) trait ReferenceTarget<T> {
    fn resolve(&self, property: &str) -> SchemaResult<ResolvedReference<T>> {
        self.resolve_key(property, &mut Vec::new())
    }

    /// `visited` holds the referenced types already followed through
    /// key-navigations, so a key that refers back to itself fails.
    fn resolve_key(
        &self,
        property: &str,
        visited: &mut Vec<&'static str>,
    ) -> SchemaResult<ResolvedReference<T>>;
}

/// Reads the related record's key from a record.
pub(crate) trait ReadForeignKey<T> {
    /// `None` when the navigation is empty.
    fn read(&self, record: &T) -> Option<Value>;
}

pub(crate) struct ResolvedReference<T> {
    pub(crate) sql_type: SqlType,
    pub(crate) reader: Box<dyn ReadForeignKey<T> + Send + Sync>,
}

struct NavigationTo<T, R> {
    get: fn(&T) -> Option<&R>,
}

/// The related record's key is a scalar column.
struct ForeignKeyReader<T, R> {
    get: fn(&T) -> Option<&R>,
    key: fn(&R) -> Value,
}

/// The related record's key is itself a foreign-key navigation.
struct ChainedKeyReader<T, R> {
    get: fn(&T) -> Option<&R>,
    key: Box<dyn ReadForeignKey<R> + Send + Sync>,
}

impl<T: 'static, R: Record> ReferenceTarget<T> for NavigationTo<T, R> {
    fn resolve_key(
        &self,
        property: &str,
        visited: &mut Vec<&'static str>,
    ) -> SchemaResult<ResolvedReference<T>> {
        let referenced_type = type_name::<R>();
        if visited.contains(&referenced_type) {
            return Err(SchemaResolutionError::CyclicReferencedKey {
                property: property.to_owned(),
                referenced_type,
            });
        }

        let mapping = R::mapping();
        if mapping.table.trim().is_empty() {
            return Err(SchemaResolutionError::missing_table(referenced_type));
        }

        // The foreign-key column holds the first key column, in mapping order.
        let key = mapping.properties.into_iter().find(|p| match p {
            Property::Scalar(c) => c.primary_key,
            Property::Reference(r) => r.primary_key && r.is_foreign_key(),
        });

        match key {
            Some(Property::Scalar(column)) => Ok(ResolvedReference {
                sql_type: column.sql_type,
                reader: Box::new(ForeignKeyReader {
                    get: self.get,
                    key: column.get,
                }),
            }),
            Some(Property::Reference(reference)) => {
                visited.push(referenced_type);
                let inner = reference
                    .target
                    .resolve_key(&reference.property, visited)?;
                Ok(ResolvedReference {
                    sql_type: inner.sql_type,
                    reader: Box::new(ChainedKeyReader {
                        get: self.get,
                        key: inner.reader,
                    }),
                })
            }
            None => Err(SchemaResolutionError::missing_primary_key(referenced_type)),
        }
    }
}

impl<T, R> ReadForeignKey<T> for ForeignKeyReader<T, R> {
    fn read(&self, record: &T) -> Option<Value> {
        (self.get)(record).map(self.key)
    }
}

impl<T, R> ReadForeignKey<T> for ChainedKeyReader<T, R> {
    fn read(&self, record: &T) -> Option<Value> {
        // An empty navigation further down leaves the key null.
        (self.get)(record).map(|related| self.key.read(related).unwrap_or(Value::Null))
    }
}
