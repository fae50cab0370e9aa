//! Merge statement construction.
//!
//! The builder is pure: the same schema, names and mode always produce the
//! same statement, and nothing here touches a database.

use crate::error::{BuilderError, BuilderResult};
use crate::mode::SyncMode;
use crate::schema::TableSchema;
use serde::Serialize;
use std::fmt;

/// Which `WHEN` branches a merge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MergeClauses {
    /// `WHEN NOT MATCHED BY TARGET THEN INSERT`
    pub insert_unmatched: bool,
    /// `WHEN MATCHED THEN UPDATE`
    pub update_matched: bool,
    /// `WHEN NOT MATCHED BY SOURCE THEN DELETE`
    pub delete_unmatched_by_source: bool,
    /// `WHEN MATCHED THEN DELETE`
    pub delete_matched: bool,
}

impl MergeClauses {
    /// Clause set used by `mode`, or `None` for modes without a merge.
    pub fn for_mode(mode: SyncMode) -> Option<Self> {
        match mode {
            SyncMode::ReplaceAll => None,
            SyncMode::UpsertNoDelete => Some(Self {
                insert_unmatched: true,
                update_matched: true,
                ..Self::default()
            }),
            SyncMode::UpsertWithDelete => Some(Self {
                insert_unmatched: true,
                update_matched: true,
                delete_unmatched_by_source: true,
                ..Self::default()
            }),
            SyncMode::DeleteMatching => Some(Self {
                delete_matched: true,
                ..Self::default()
            }),
        }
    }
}

/// A set-based merge of a source table into a target table.
///
/// `Display` renders the exact SQL text sent to the server; the in-memory
/// database executes the structured form directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeStatement {
    /// Table being reconciled.
    pub target: String,
    /// Table holding the incoming rows.
    pub source: String,
    /// Primary-key columns, in schema order.
    pub key_columns: Vec<String>,
    /// Non-identity columns.
    pub insert_columns: Vec<String>,
    /// Non-key columns.
    pub update_columns: Vec<String>,
    /// Branches to emit.
    pub clauses: MergeClauses,
}

impl MergeStatement {
    /// `TARGET.[k]=SOURCE.[k]` for every key column, joined with `AND`.
    pub fn match_condition(&self) -> String {
        self.key_columns
            .iter()
            .map(|c| {
                let c = quote_identifier(c);
                format!("TARGET.{c}=SOURCE.{c}")
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// The quoted insert list.
    pub fn insert_list(&self) -> String {
        self.insert_columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The `TARGET.[c]=SOURCE.[c]` update list.
    pub fn update_list(&self) -> String {
        self.update_columns
            .iter()
            .map(|c| {
                let c = quote_identifier(c);
                format!("TARGET.{c}=SOURCE.{c}")
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for MergeStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = vec![format!(
            "MERGE {} AS TARGET USING {} AS SOURCE ON {}",
            self.target,
            self.source,
            self.match_condition()
        )];
        if self.clauses.insert_unmatched {
            let insert = self.insert_list();
            lines.push(format!(
                "WHEN NOT MATCHED BY TARGET THEN INSERT ({insert}) VALUES ({insert})"
            ));
        }
        if self.clauses.update_matched {
            lines.push(format!("WHEN MATCHED THEN UPDATE SET {}", self.update_list()));
        }
        if self.clauses.delete_unmatched_by_source {
            lines.push("WHEN NOT MATCHED BY SOURCE THEN DELETE".to_owned());
        }
        if self.clauses.delete_matched {
            lines.push("WHEN MATCHED THEN DELETE".to_owned());
        }
        write!(f, "{};", lines.join("\n"))
    }
}

/// Wraps a column name in brackets, doubling any `]`.
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Plans the merge for `mode` without rendering it.
///
/// Identity columns are left out of the insert list and key columns out of
/// the update list. Fails for [`SyncMode::ReplaceAll`], for a schema without
/// key columns, and when a list the mode needs ends up empty.
pub fn plan(
    schema: &TableSchema,
    source: &str,
    target: &str,
    mode: SyncMode,
) -> BuilderResult<MergeStatement> {
    let clauses = MergeClauses::for_mode(mode).ok_or(BuilderError::NoMerge { mode })?;

    let key_columns: Vec<String> = schema.primary_key_columns().map(|c| c.name.clone()).collect();
    if key_columns.is_empty() {
        return Err(BuilderError::NoKeyColumns {
            table: target.to_owned(),
        });
    }

    let insert_columns: Vec<String> = schema
        .columns()
        .iter()
        .filter(|c| !c.is_identity)
        .map(|c| c.name.clone())
        .collect();
    let update_columns: Vec<String> = schema
        .columns()
        .iter()
        .filter(|c| !c.is_primary_key)
        .map(|c| c.name.clone())
        .collect();

    if clauses.insert_unmatched && insert_columns.is_empty() {
        return Err(BuilderError::NoInsertColumns {
            table: target.to_owned(),
        });
    }
    if clauses.update_matched && update_columns.is_empty() {
        return Err(BuilderError::NoUpdateColumns {
            table: target.to_owned(),
        });
    }

    Ok(MergeStatement {
        target: target.to_owned(),
        source: source.to_owned(),
        key_columns,
        insert_columns,
        update_columns,
        clauses,
    })
}

/// Renders the merge text for `mode`.
pub fn build(
    schema: &TableSchema,
    source: &str,
    target: &str,
    mode: SyncMode,
) -> BuilderResult<String> {
    plan(schema, source, target, mode).map(|m| m.to_string())
}
