//! Read/write table JSON files.
//!
//! Table JSON is the "portable" representation of one refresh:
//! - run metadata (window, source, generation time)
//! - every enriched row, so charts can be redrawn without refetching

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::domain::{EnrichedObservation, YearWindow};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub source: String,
    pub window: YearWindow,
    pub rows: Vec<EnrichedObservation>,
}

impl TableFile {
    pub fn from_run(run: &RunOutput) -> Self {
        Self {
            tool: "econ".to_string(),
            generated_at: run.fetched_at,
            source: run.source.clone(),
            window: run.window,
            rows: run.table.clone(),
        }
    }

    /// Rebuild a run from a saved table, for plotting offline.
    pub fn into_run(self) -> RunOutput {
        RunOutput {
            window: self.window,
            source: self.source,
            fetched_at: self.generated_at,
            n_observations: self.rows.len(),
            table: self.rows,
            failure: None,
        }
    }
}

/// Write a table JSON file.
pub fn write_table_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create table JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &TableFile::from_run(run))
        .map_err(|e| AppError::config(format!("Failed to write table JSON: {e}")))?;

    Ok(())
}

/// Read a table JSON file.
pub fn read_table_json(path: &Path) -> Result<TableFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open table JSON '{}': {e}", path.display())))?;
    let table: TableFile =
        serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid table JSON: {e}")))?;
    Ok(table)
}
