//! Field-resolution rules for loosely keyed report records.
//!
//! Upstream report revisions rename fields (`frame_muscle` vs `grade`,
//! `avg_price` vs `wtd_avg_price`, ...). Rather than hard-coding fallback
//! chains in control flow, each logical field is a [`FieldRule`]: an ordered
//! list of raw keys evaluated by one resolver. The first key that yields a
//! usable value wins.

use serde_json::{Map, Value};

use crate::domain::{ClassMode, DatePolicy, ReportConfig, Sex};

/// One raw report record: an untyped JSON object.
pub type RawRecord = Map<String, Value>;

/// Text values treated the same as a missing field.
const PLACEHOLDERS: [&str; 6] = ["N/A", "NA", "NONE", "NULL", "-", "--"];

/// Ordered list of raw keys for one logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    fields: Vec<String>,
}

impl FieldRule {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// First non-empty, non-placeholder text value (trimmed).
    ///
    /// JSON numbers are rendered as text (`1` -> `"1"`), except a numeric zero,
    /// which counts as missing like it does in the number chains. Booleans,
    /// arrays and objects are skipped.
    pub fn resolve_text(&self, record: &RawRecord) -> Option<String> {
        self.fields
            .iter()
            .filter_map(|key| record.get(key))
            .find_map(text_value)
    }

    /// First value that parses as a finite, strictly positive number.
    ///
    /// Zero counts as missing. The source treats a zero price as "no quote"
    /// and so do we; a strict null check would admit zero-priced brackets.
    pub fn resolve_number(&self, record: &RawRecord) -> Option<f64> {
        self.fields
            .iter()
            .filter_map(|key| record.get(key))
            .find_map(number_value)
    }
}

fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || is_placeholder(&text) {
        return None;
    }
    Some(text)
}

fn number_value(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_number(s)?,
        _ => return None,
    };
    if v.is_finite() && v > 0.0 { Some(v) } else { None }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn is_placeholder(text: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| text.eq_ignore_ascii_case(p))
}

/// Complete normalization policy: field chains, class tokens, and modes.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeRules {
    pub class: FieldRule,
    pub grade: FieldRule,
    pub price: FieldRule,
    pub weight: FieldRule,
    pub weight_range: FieldRule,
    pub report_date: FieldRule,
    /// Substring tokens checked in order against the uppercased class label.
    pub sex_tokens: Vec<(String, Sex)>,
    pub class_mode: ClassMode,
    pub date_policy: DatePolicy,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            class: FieldRule::new(["class", "class_description", "sex"]),
            grade: FieldRule::new(["frame_muscle", "grade", "quality_grade"]),
            price: FieldRule::new(["avg_price", "wtd_avg_price"]),
            weight: FieldRule::new(["avg_weight", "wtd_avg_weight"]),
            weight_range: FieldRule::new(["wgt_range", "weight_range"]),
            report_date: FieldRule::new(["report_date", "report_begin_date", "published_date"]),
            sex_tokens: vec![
                ("STEER".to_string(), Sex::Steers),
                ("HEIFER".to_string(), Sex::Heifers),
            ],
            class_mode: ClassMode::SteersHeifers,
            date_policy: DatePolicy::FirstSeen,
        }
    }
}

impl NormalizeRules {
    pub fn from_config(config: &ReportConfig) -> Self {
        let mut rules = Self {
            class_mode: config.class_mode,
            date_policy: config.date_policy,
            ..Self::default()
        };
        if !config.grade_fields.is_empty() {
            rules.grade = FieldRule::new(config.grade_fields.iter().cloned());
        }
        rules
    }

    /// Map a user-supplied sex label onto the same classes the data uses.
    ///
    /// `feeder steers` selects `Steers` just like the record label would;
    /// labels no token matches fall back to `Sex::parse`.
    pub fn parse_sex(&self, raw: &str) -> Sex {
        let upper = raw.trim().to_uppercase();
        self.sex_tokens
            .iter()
            .find(|(token, _)| upper.contains(token.as_str()))
            .map(|(_, sex)| sex.clone())
            .unwrap_or_else(|| Sex::parse(raw))
    }

    /// Classify an uppercased class label by substring containment.
    ///
    /// Labels arrive as `Steers`, `STEER`, `Feeder Steers`, ... so exact
    /// matching is not an option. Returns `None` when the record should be
    /// dropped.
    pub fn classify(&self, class_upper: &str) -> Option<Sex> {
        for (token, sex) in &self.sex_tokens {
            if class_upper.contains(token.as_str()) {
                return Some(sex.clone());
            }
        }
        match self.class_mode {
            ClassMode::SteersHeifers => None,
            ClassMode::AllClasses => Some(Sex::Other(class_upper.to_string())),
        }
    }
}
