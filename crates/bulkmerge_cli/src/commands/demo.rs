//! Demo command implementation.
//!
//! Creates an in-memory `Employees` table, optionally fills it with an older
//! generation of rows, and synchronizes freshly generated employees into it.

use super::{CommandError, OutputFormat};
use crate::employee::{self, Employee};
use bulkmerge_core::{
    resolve, MemoryDatabase, SyncConfig, SyncEngine, SyncMode, SyncReport, SyncStats,
    TableDefinition,
};
use serde::Serialize;
use tracing::info;

/// Options of the demo command.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Records to synchronize.
    pub rows: usize,
    /// Synchronization mode.
    pub mode: SyncMode,
    /// Rows already present in the table before the call.
    pub existing: usize,
    /// Engine configuration.
    pub config: SyncConfig,
    /// Output format.
    pub format: OutputFormat,
}

/// Demo outcome.
#[derive(Debug, Serialize)]
pub struct DemoResult {
    /// Report of the synchronization call.
    pub report: SyncReport,
    /// Rows in the table before the call.
    pub rows_before: usize,
    /// Rows in the table after the call.
    pub rows_after: usize,
    /// Engine statistics.
    pub stats: SyncStats,
}

/// Runs the demo command.
pub fn run(options: &DemoOptions) -> Result<DemoResult, CommandError> {
    let db = MemoryDatabase::new();
    let schema = resolve::<Employee>()?;
    db.create_table(TableDefinition::from_schema(schema.table_schema()))?;

    if options.existing > 0 {
        // Existing rows start halfway so the call both updates and inserts.
        let first = (options.rows / 2) as i32 + 1;
        seed(&db, &employee::generate(first, options.existing, "Old"))?;
    }
    let rows_before = db.row_count("Employees").unwrap_or(0);

    let records = employee::generate(1, options.rows, "");
    info!(rows = records.len(), mode = %options.mode, "synchronizing demo employees");

    let engine = SyncEngine::new(options.config.clone());
    let report = engine.sync(&mut db.connect(), &records, options.mode)?;

    let result = DemoResult {
        report,
        rows_before,
        rows_after: db.row_count("Employees").unwrap_or(0),
        stats: engine.stats(),
    };

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text_output(&result, &db),
    }
    Ok(result)
}

fn seed(db: &MemoryDatabase, employees: &[Employee]) -> Result<(), CommandError> {
    let rows = employees
        .iter()
        .map(|e| {
            vec![
                e.id.into(),
                e.first_name.as_str().into(),
                e.last_name.as_str().into(),
                e.dob.into(),
            ]
        })
        .collect();
    db.insert_rows("Employees", rows)?;
    Ok(())
}

fn print_text_output(result: &DemoResult, db: &MemoryDatabase) {
    let report = &result.report;
    println!("=== bulkmerge demo ===");
    println!();
    println!("Mode:              {}", report.mode);
    println!("Table:             {}", report.table);
    if let Some(staging) = &report.staging_table {
        println!("Staging table:     {staging}");
    }
    println!("Rows before:       {}", result.rows_before);
    println!("Rows materialized: {}", report.rows_materialized);
    println!("Rows transferred:  {}", report.rows_transferred);
    println!("Rows affected:     {}", report.rows_affected);
    println!("Rows after:        {}", result.rows_after);
    println!("Elapsed:           {:.3} ms", report.duration.as_secs_f64() * 1000.0);
    println!();
    println!("Statements:");
    for entry in db.log() {
        println!("  {}", entry.to_string().replace('\n', "\n  "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(mode: SyncMode, rows: usize, existing: usize) -> DemoOptions {
        DemoOptions {
            rows,
            mode,
            existing,
            config: SyncConfig::default(),
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn test_replace_all_demo() {
        let result = run(&options(SyncMode::ReplaceAll, 100, 0)).unwrap();
        assert_eq!(result.rows_after, 100);
        assert_eq!(result.report.rows_transferred, 100);
        assert_eq!(result.stats.calls_succeeded, 1);
    }

    #[test]
    fn test_upsert_over_existing_rows() {
        // Existing rows 51..=110, records 1..=100.
        let result = run(&options(SyncMode::UpsertNoDelete, 100, 60)).unwrap();
        assert_eq!(result.rows_before, 60);
        assert_eq!(result.rows_after, 110);
        assert_eq!(result.report.rows_affected, 100);
    }

    #[test]
    fn test_upsert_with_delete_trims_extra_rows() {
        let result = run(&options(SyncMode::UpsertWithDelete, 100, 60)).unwrap();
        assert_eq!(result.rows_after, 100);
        assert_eq!(result.report.rows_affected, 110);
    }

    #[test]
    fn test_delete_matching_demo() {
        let result = run(&options(SyncMode::DeleteMatching, 100, 60)).unwrap();
        assert_eq!(result.rows_after, 10);
    }
}
