//! Read/write raw report JSON files.
//!
//! A saved report keeps the upstream body shape (`{ "results": [...] }`) so
//! it can be replayed with `--input` without credentials or network access.

use std::fs::File;
use std::path::Path;

use serde_json::{Value, json};

use crate::error::{AppError, ReportError};
use crate::io::rules::RawRecord;

/// Extract the record list from a report body.
///
/// A missing `results` key is an empty report. Non-object entries are skipped.
pub fn records_from_body(body: Value) -> Vec<RawRecord> {
    let Value::Object(mut map) = body else {
        return Vec::new();
    };
    let Some(Value::Array(results)) = map.remove("results") else {
        return Vec::new();
    };
    results
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(obj) => Some(obj),
            _ => None,
        })
        .collect()
}

/// Read a saved report body.
pub fn read_report_json(path: &Path) -> Result<Vec<RawRecord>, ReportError> {
    let file = File::open(path).map_err(|e| {
        ReportError::Transport(format!("Failed to open report JSON '{}': {e}", path.display()))
    })?;
    let body: Value = serde_json::from_reader(file)
        .map_err(|e| ReportError::Transport(format!("Invalid report JSON '{}': {e}", path.display())))?;
    Ok(records_from_body(body))
}

/// Write raw records as a report body.
pub fn write_report_json(path: &Path, records: &[RawRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &json!({ "results": records }))
        .map_err(|e| AppError::new(4, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}
