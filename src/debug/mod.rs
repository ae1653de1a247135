//! Debug bundle writer for inspecting a normalized report snapshot.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::NormalizedReport;
use crate::error::AppError;
use crate::slice::{brackets_for, grades_for, sexes};

/// Write `debug/vog_debug_<timestamp>.md` under `root` and return its path.
pub fn write_debug_bundle(root: &Path, report: &NormalizedReport, source: &str) -> Result<PathBuf, AppError> {
    let dir = root.join("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("vog_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(render_bundle(report, source).as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug bundle: {e}")))?;

    Ok(path)
}

fn render_bundle(report: &NormalizedReport, source: &str) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str("# vog debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- source: {source}\n"));
    out.push_str(&format!(
        "- report_date: {}\n",
        report.report_date.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("- records_read: {}\n", stats.records_read));
    out.push_str(&format!("- dropped_unclassified: {}\n", stats.dropped_unclassified));
    out.push_str(&format!("- dropped_missing_fields: {}\n", stats.dropped_missing_fields));
    out.push_str(&format!("- dropped_older_date: {}\n", stats.dropped_older_date));
    out.push_str(&format!("- dropped_undated: {}\n", stats.dropped_undated));
    out.push_str(&format!("- entries_kept: {}\n", stats.entries_kept));

    for sex in sexes(&report.entries) {
        for grade in grades_for(&report.entries, &sex) {
            out.push_str(&format!("\n## {sex} / {grade}\n"));
            out.push_str("| range | avg_weight | avg_price | head_value |\n");
            out.push_str("| - | - | - | - |\n");
            for e in brackets_for(&report.entries, &sex, &grade) {
                out.push_str(&format!(
                    "| {} | {:.1} | {:.2} | {:.2} |\n",
                    e.weight_range,
                    e.avg_weight,
                    e.avg_price,
                    e.head_value()
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketEntry, NormalizeStats, Sex};

    #[test]
    fn bundle_groups_brackets_by_slice() {
        let entry = |sex: Sex, grade: &str, range: &str| MarketEntry {
            report_date: Some("03/07/2025".to_string()),
            sex,
            grade: grade.to_string(),
            weight_range: range.to_string(),
            avg_weight: 550.0,
            avg_price: 300.0,
        };
        let report = NormalizedReport {
            entries: vec![
                entry(Sex::Steers, "1", "500-600"),
                entry(Sex::Steers, "1", "600-700"),
                entry(Sex::Heifers, "2", "500-600"),
            ],
            report_date: Some("03/07/2025".to_string()),
            stats: NormalizeStats::default(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = write_debug_bundle(dir.path(), &report, "report.json").unwrap();
        let text = std::fs::read_to_string(path).unwrap();

        assert!(text.contains("## Steers / 1"));
        assert!(text.contains("## Heifers / 2"));
        assert_eq!(text.matches("| 500-600 |").count(), 2);
    }
}
