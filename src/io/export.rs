//! Export the normalized table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::NormalizedReport;
use crate::error::AppError;

/// Write one CSV row per normalized entry.
pub fn write_table_csv(path: &Path, report: &NormalizedReport) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(
        file,
        "report_date,sex,grade,weight_range,avg_weight,avg_price,head_value"
    )
    .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for entry in &report.entries {
        writeln!(
            file,
            "{},{},{},{},{:.2},{:.2},{:.2}",
            csv_field(entry.report_date.as_deref().unwrap_or("")),
            csv_field(entry.sex.display_name()),
            csv_field(&entry.grade),
            csv_field(&entry.weight_range),
            entry.avg_weight,
            entry.avg_price,
            entry.head_value(),
        )
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketEntry, NormalizeStats, Sex};

    #[test]
    fn writes_one_row_per_entry() {
        let report = NormalizedReport {
            entries: vec![
                MarketEntry {
                    report_date: Some("03/07/2025".to_string()),
                    sex: Sex::Steers,
                    grade: "1".to_string(),
                    weight_range: "500-600".to_string(),
                    avg_weight: 550.0,
                    avg_price: 300.0,
                },
                MarketEntry {
                    report_date: Some("03/07/2025".to_string()),
                    sex: Sex::Heifers,
                    grade: "MEDIUM, LARGE 1".to_string(),
                    weight_range: "600-700".to_string(),
                    avg_weight: 650.0,
                    avg_price: 260.0,
                },
            ],
            report_date: Some("03/07/2025".to_string()),
            stats: NormalizeStats::default(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        write_table_csv(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "03/07/2025,Steers,1,500-600,550.00,300.00,1650.00");
        assert!(lines[2].contains("\"MEDIUM, LARGE 1\""));
    }
}
