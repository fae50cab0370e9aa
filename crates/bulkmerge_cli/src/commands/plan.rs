//! Plan command implementation.

use super::{CommandError, OutputFormat};
use crate::employee::Employee;
use bulkmerge_core::{SyncConfig, SyncEngine, SyncMode};
use serde::Serialize;

/// Statements one mode would execute.
#[derive(Debug, Serialize)]
pub struct PlanResult {
    /// Mode that was planned.
    pub mode: SyncMode,
    /// SQL text, in execution order.
    pub statements: Vec<String>,
}

/// Runs the plan command.
pub fn run(
    mode: SyncMode,
    config: SyncConfig,
    format: OutputFormat,
) -> Result<PlanResult, CommandError> {
    let statements = SyncEngine::new(config)
        .preview::<Employee>(mode)?
        .iter()
        .map(ToString::to_string)
        .collect();
    let result = PlanResult { mode, statements };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("-- {mode}");
            if !mode.uses_staging() {
                println!("-- runs in one transaction; rows are bulk-written after the delete");
            }
            for statement in &result.statements {
                println!("{statement}");
                println!("GO");
            }
        }
    }
    Ok(result)
}
