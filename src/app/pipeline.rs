//! Shared "report pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source -> cached fetch -> normalize -> select slice -> compute profit
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::{FileSource, ReportCache, ReportSource, UsdaClient};
use crate::domain::{FeedingAssumptions, MarketEntry, NormalizedReport, ProfitResult, ReportConfig, Sex};
use crate::error::{AppError, ReportError};
use crate::io::rules::NormalizeRules;
use crate::profit::compute_profit;
use crate::slice::{brackets_for, find_bracket};

pub type SharedCache = ReportCache<Box<dyn ReportSource>>;

/// Build the report source: a saved file when `--input` is given, else the API.
pub fn open_source(config: &ReportConfig) -> Result<Box<dyn ReportSource>, ReportError> {
    match &config.input {
        Some(path) => Ok(Box::new(FileSource::new(path))),
        None => Ok(Box::new(UsdaClient::from_env(&config.endpoint, config.timeout)?)),
    }
}

/// Build the cached snapshot for a run.
pub fn open_cache(config: &ReportConfig) -> Result<SharedCache, ReportError> {
    let source = open_source(config)?;
    Ok(ReportCache::new(
        source,
        NormalizeRules::from_config(config),
        config.cache_ttl,
    ))
}

/// A purchase/sale selection within one sex+grade slice.
#[derive(Debug, Clone)]
pub struct CalcRequest {
    pub sex: Sex,
    pub grade: String,
    pub buy_range: String,
    pub sell_range: String,
}

/// The selected brackets and the computed metrics.
#[derive(Debug, Clone)]
pub struct CalcOutput {
    pub purchase: MarketEntry,
    pub sale: MarketEntry,
    pub result: ProfitResult,
}

/// Resolve both brackets in the slice and compute profit.
pub fn run_calc(
    report: &NormalizedReport,
    request: &CalcRequest,
    assumptions: &FeedingAssumptions,
) -> Result<CalcOutput, AppError> {
    let purchase = lookup(report, request, &request.buy_range)?;
    let sale = lookup(report, request, &request.sell_range)?;
    let result = compute_profit(purchase, sale, assumptions)?;

    Ok(CalcOutput {
        purchase: purchase.clone(),
        sale: sale.clone(),
        result,
    })
}

fn lookup<'a>(
    report: &'a NormalizedReport,
    request: &CalcRequest,
    range: &str,
) -> Result<&'a MarketEntry, AppError> {
    if let Some(entry) = find_bracket(&report.entries, &request.sex, &request.grade, range) {
        return Ok(entry);
    }

    let available: Vec<&str> = brackets_for(&report.entries, &request.sex, &request.grade)
        .iter()
        .map(|e| e.weight_range.as_str())
        .collect();
    if available.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "No data for {} grade {} in this report.",
                request.sex,
                request.grade.to_uppercase()
            ),
        ));
    }
    Err(AppError::new(
        2,
        format!(
            "Weight range '{range}' not found for {} grade {}. Available: {}",
            request.sex,
            request.grade.to_uppercase(),
            available.join(", ")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;

    const REPORT: &str = r#"{"results": [
        {"report_date": "03/07/2025", "class": "Feeder Steers", "frame_muscle": "Medium and Large 1", "wgt_range": "500-550", "avg_weight": 500, "avg_price": 180},
        {"report_date": "03/07/2025", "class": "Feeder Steers", "frame_muscle": "Medium and Large 1", "wgt_range": "700-800", "avg_weight": 750, "avg_price": 160},
        {"report_date": "03/07/2025", "class": "Feeder Heifers", "grade": "Medium and Large 1", "wgt_range": "500-550", "avg_weight": 520, "avg_price": 175},
        {"report_date": "02/28/2025", "class": "Feeder Steers", "frame_muscle": "Medium and Large 1", "wgt_range": "800-900", "avg_weight": 850, "avg_price": 150},
        {"report_date": "03/07/2025", "class": "Feeder Steers", "wgt_range": "600-700", "avg_weight": 650}
    ]}"#;

    fn config_for(path: &Path) -> ReportConfig {
        ReportConfig {
            input: Some(path.to_path_buf()),
            ..ReportConfig::default()
        }
    }

    fn request(buy: &str, sell: &str) -> CalcRequest {
        CalcRequest {
            sex: Sex::Steers,
            grade: "medium and large 1".to_string(),
            buy_range: buy.to_string(),
            sell_range: sell.to_string(),
        }
    }

    #[test]
    fn saved_report_flows_through_to_profit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, REPORT).unwrap();

        let cache = open_cache(&config_for(&path)).unwrap();
        let report = cache.get_or_refresh().unwrap();
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.report_date.as_deref(), Some("03/07/2025"));

        let assumptions = FeedingAssumptions::new(0.95, 2.5).unwrap();
        let out = run_calc(&report, &request("500-550", "700-800"), &assumptions).unwrap();
        assert!((out.result.net_profit - 62.5).abs() < 1e-9);
        assert_eq!(out.result.whole_days(), 100);

        // Same snapshot on the next call.
        let again = cache.get_or_refresh().unwrap();
        assert!(Arc::ptr_eq(&report, &again));
    }

    #[test]
    fn older_date_brackets_are_not_selectable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, REPORT).unwrap();

        let report = open_cache(&config_for(&path)).unwrap().get_or_refresh().unwrap();
        let err = run_calc(&report, &request("500-550", "800-900"), &FeedingAssumptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("700-800"));
    }

    #[test]
    fn reversed_selection_is_invalid_gain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, REPORT).unwrap();

        let report = open_cache(&config_for(&path)).unwrap().get_or_refresh().unwrap();
        let err = run_calc(&report, &request("700-800", "500-550"), &FeedingAssumptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("must be greater"));
    }

    #[test]
    fn unknown_slice_reports_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, REPORT).unwrap();

        let report = open_cache(&config_for(&path)).unwrap().get_or_refresh().unwrap();
        let mut req = request("500-550", "700-800");
        req.grade = "2".to_string();
        let err = run_calc(&report, &req, &FeedingAssumptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
