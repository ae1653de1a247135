//! Selection queries over the normalized table.
//!
//! Front-ends narrow the table in three steps: sex, then grade, then a
//! weight bracket. All lists keep first-seen table order and never copy
//! entries. Grade comparison ignores case (the normalizer already
//! uppercases, but user input may not be).

use crate::domain::{MarketEntry, Sex};

/// Distinct sexes present in the table.
pub fn sexes(entries: &[MarketEntry]) -> Vec<Sex> {
    let mut out: Vec<Sex> = Vec::new();
    for e in entries {
        if !out.contains(&e.sex) {
            out.push(e.sex.clone());
        }
    }
    out
}

/// Distinct grades available for `sex`.
pub fn grades_for(entries: &[MarketEntry], sex: &Sex) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for e in entries.iter().filter(|e| &e.sex == sex) {
        if !out.iter().any(|g| g.eq_ignore_ascii_case(&e.grade)) {
            out.push(e.grade.clone());
        }
    }
    out
}

/// Weight-bracket rows of one sex+grade slice.
pub fn brackets_for<'a>(entries: &'a [MarketEntry], sex: &Sex, grade: &str) -> Vec<&'a MarketEntry> {
    entries
        .iter()
        .filter(|e| &e.sex == sex && e.grade.eq_ignore_ascii_case(grade.trim()))
        .collect()
}

/// Look up a bracket by its weight-range label; the first match wins.
pub fn find_bracket<'a>(
    entries: &'a [MarketEntry],
    sex: &Sex,
    grade: &str,
    weight_range: &str,
) -> Option<&'a MarketEntry> {
    brackets_for(entries, sex, grade)
        .into_iter()
        .find(|e| e.weight_range.trim() == weight_range.trim())
}
