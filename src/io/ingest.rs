//! Report ingest and normalization.
//!
//! This module is responsible for turning a heterogeneous market report into
//! a clean, single-date table of `MarketEntry` rows that is safe to select
//! from and price.
//!
//! Design goals:
//! - **Tolerant rows**: records with missing/unparseable price or weight are
//!   dropped silently and only counted; the run fails only if nothing is left
//! - **Data-driven field resolution** via `NormalizeRules`
//! - **Deterministic behavior**: same input, same table, same order

use chrono::NaiveDate;

use crate::domain::{DatePolicy, MarketEntry, NO_GRADE, NO_RANGE, NormalizeStats, NormalizedReport};
use crate::error::ReportError;
use crate::io::rules::{NormalizeRules, RawRecord};

/// Class label assumed when a record has no class field at all.
const UNKNOWN_CLASS: &str = "UNKNOWN";

/// Why a single record was left out of the table. Never surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordSkip {
    Unclassified,
    MissingField(&'static str),
}

/// Normalize raw report records into a single-date table.
pub fn normalize(raw: &[RawRecord], rules: &NormalizeRules) -> Result<NormalizedReport, ReportError> {
    if raw.is_empty() {
        return Err(ReportError::EmptySource);
    }

    let mut stats = NormalizeStats {
        records_read: raw.len(),
        ..NormalizeStats::default()
    };

    let mut entries = Vec::with_capacity(raw.len());
    for record in raw {
        match normalize_record(record, rules) {
            Ok(entry) => entries.push(entry),
            Err(RecordSkip::Unclassified) => stats.dropped_unclassified += 1,
            Err(RecordSkip::MissingField(field)) => {
                tracing::trace!(field, "dropping record without a usable value");
                stats.dropped_missing_fields += 1;
            }
        }
    }

    if entries.is_empty() {
        tracing::debug!(?stats, "no records survived normalization");
        return Err(ReportError::NoMatchingData);
    }

    // Undated records never set the working date; they survive only when
    // no record carries a date at all.
    let report_date = select_report_date(&entries, rules.date_policy);
    entries.retain(|e| {
        if e.report_date == report_date {
            return true;
        }
        if e.report_date.is_none() {
            stats.dropped_undated += 1;
        } else {
            stats.dropped_older_date += 1;
        }
        false
    });
    stats.entries_kept = entries.len();

    tracing::debug!(
        report_date = report_date.as_deref().unwrap_or("-"),
        ?stats,
        "normalized market report"
    );

    Ok(NormalizedReport {
        entries,
        report_date,
        stats,
    })
}

fn normalize_record(record: &RawRecord, rules: &NormalizeRules) -> Result<MarketEntry, RecordSkip> {
    // 1) Classify by class label (substring match on the uppercased text).
    let class_upper = rules
        .class
        .resolve_text(record)
        .unwrap_or_else(|| UNKNOWN_CLASS.to_string())
        .to_uppercase();
    let sex = rules.classify(&class_upper).ok_or(RecordSkip::Unclassified)?;

    // 2) Required numeric fields.
    let avg_price = rules
        .price
        .resolve_number(record)
        .ok_or(RecordSkip::MissingField("price"))?;
    let avg_weight = rules
        .weight
        .resolve_number(record)
        .ok_or(RecordSkip::MissingField("weight"))?;

    // 3) Grade through its fallback chain, then the sentinel.
    let grade = rules
        .grade
        .resolve_text(record)
        .map(|g| g.trim().to_uppercase())
        .unwrap_or_else(|| NO_GRADE.to_string());

    let weight_range = rules
        .weight_range
        .resolve_text(record)
        .unwrap_or_else(|| NO_RANGE.to_string());

    Ok(MarketEntry {
        report_date: rules.report_date.resolve_text(record),
        sex,
        grade,
        weight_range,
        avg_weight,
        avg_price,
    })
}

/// Pick the one date token the working table is restricted to.
fn select_report_date(entries: &[MarketEntry], policy: DatePolicy) -> Option<String> {
    let first_seen = entries.iter().find_map(|e| e.report_date.clone());

    match policy {
        DatePolicy::FirstSeen => first_seen,
        DatePolicy::Latest => {
            let mut latest: Option<(NaiveDate, &str)> = None;
            for token in entries.iter().filter_map(|e| e.report_date.as_deref()) {
                let Some(date) = parse_report_date(token) else {
                    tracing::warn!(token, "unparseable report date; using first-seen date");
                    return first_seen;
                };
                if latest.is_none_or(|(best, _)| date > best) {
                    latest = Some((date, token));
                }
            }
            latest.map(|(_, token)| token.to_string()).or(first_seen)
        }
    }
}

fn parse_report_date(s: &str) -> Option<NaiveDate> {
    // MARS reports use `MM/DD/YYYY`; saved or hand-edited files often carry ISO dates.
    const FMTS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y", "%Y/%m/%d"];
    let s = s.trim();
    FMTS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
