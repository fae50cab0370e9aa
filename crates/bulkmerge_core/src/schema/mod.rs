//! Record mapping and schema resolution.
//!
//! A record type describes itself through [`Record::mapping`]. The resolver
//! turns that description into a [`TableSchema`] plus the accessors the
//! materializer uses, and [`SchemaResolver`] keeps the result per type.

mod mapping;
mod resolver;
mod table;

pub use mapping::{Column, EntityMapping, Record, Reference};
pub use resolver::{resolve, ResolvedSchema, SchemaResolver};
pub use table::{ColumnDescriptor, TableSchema};

pub(crate) use resolver::ColumnAccessor;
