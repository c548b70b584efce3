//! Export the enriched table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::EnrichedObservation;
use crate::error::AppError;

/// Write the enriched table to a CSV file, one row per observation.
///
/// Undefined change values are written as empty cells.
pub fn write_table_csv(path: &Path, table: &[EnrichedObservation]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_csv(&mut file, table)
}

fn write_csv<W: Write>(out: &mut W, table: &[EnrichedObservation]) -> Result<(), AppError> {
    writeln!(
        out,
        "series_id,series_name,date,year,month,value,mom_change,mom_pct_change,yoy_pct_change"
    )
    .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for r in table {
        let o = &r.observation;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            o.series_id,
            csv_field(&o.series_name),
            o.date,
            o.year,
            o.month,
            o.value,
            opt_cell(r.mom_change),
            opt_cell(r.mom_pct_change),
            opt_cell(r.yoy_pct_change),
        )
        .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

fn opt_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.10}")).unwrap_or_default()
}

/// Quote a field when it contains a delimiter or quote.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
