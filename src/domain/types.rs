//! Shared domain types.
//!
//! These types are intentionally plain data so they can be:
//!
//! - produced by the normalizer and held in an immutable snapshot
//! - filtered by the selection helpers without copying the whole table
//! - exported to CSV or rendered by any front-end

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Default MARS endpoint for the feeder cattle auction summary (report 1831).
pub const DEFAULT_REPORT_URL: &str = "https://marsapi.ams.usda.gov/services/v1.1/reports/1831";

/// Sentinel grade for records with no frame/muscle or grade field.
pub const NO_GRADE: &str = "NO GRADE";

/// Weight-range label used when a record carries no bracket label.
pub const NO_RANGE: &str = "N/A";

/// Target average daily gain bounds (lbs/day).
pub const ADG_MIN: f64 = 0.5;
pub const ADG_MAX: f64 = 4.0;

pub const DEFAULT_TARGET_ADG: f64 = 3.0;
pub const DEFAULT_COST_OF_GAIN: f64 = 1.10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Animal class of a market entry.
///
/// `Other` only appears when normalizing in [`ClassMode::AllClasses`]; it
/// carries the uppercased class label of the source record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Steers,
    Heifers,
    Other(String),
}

impl Sex {
    pub fn display_name(&self) -> &str {
        match self {
            Sex::Steers => "Steers",
            Sex::Heifers => "Heifers",
            Sex::Other(label) => label,
        }
    }

    /// Case-insensitive parse of a user-supplied sex label.
    pub fn parse(raw: &str) -> Sex {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            "STEER" | "STEERS" => Sex::Steers,
            "HEIFER" | "HEIFERS" => Sex::Heifers,
            _ => Sex::Other(upper),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which animal classes survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassMode {
    /// Keep only records whose class mentions steers or heifers.
    SteersHeifers,
    /// Keep every class; unmatched labels pass through as `Sex::Other`.
    AllClasses,
}

/// How the single working report date is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DatePolicy {
    /// The first date token seen among surviving records is the most recent.
    ///
    /// The upstream report lists its newest auction first; input order is
    /// trusted and never sorted.
    FirstSeen,
    /// Parse date tokens and keep the chronologically latest one.
    ///
    /// Falls back to `FirstSeen` when any surviving token fails to parse.
    Latest,
}

/// One normalized weight bracket of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEntry {
    /// Opaque date token, used only for equality grouping.
    pub report_date: Option<String>,
    pub sex: Sex,
    /// Uppercased, trimmed grade (or [`NO_GRADE`]).
    pub grade: String,
    /// Bracket label, e.g. `700-800`.
    pub weight_range: String,
    /// Average weight in lbs (> 0).
    pub avg_weight: f64,
    /// Average price in $/cwt (> 0).
    pub avg_price: f64,
}

impl MarketEntry {
    /// Dollar value of one head at this bracket's average weight.
    pub fn head_value(&self) -> f64 {
        (self.avg_price / 100.0) * self.avg_weight
    }
}

/// Counts describing what the normalizer kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub records_read: usize,
    pub dropped_unclassified: usize,
    pub dropped_missing_fields: usize,
    pub dropped_older_date: usize,
    /// Records without any date token, dropped once another record set the date.
    pub dropped_undated: usize,
    pub entries_kept: usize,
}

/// The clean, single-date table produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReport {
    pub entries: Vec<MarketEntry>,
    /// The date token every entry shares (`None` when the source had no dates).
    pub report_date: Option<String>,
    pub stats: NormalizeStats,
}

/// User-chosen feeding assumptions for the profit calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedingAssumptions {
    cost_of_gain: f64,
    target_adg: f64,
}

impl FeedingAssumptions {
    /// Validate cost of gain ($/lb, >= 0) and target ADG (lbs/day, within bounds).
    pub fn new(cost_of_gain: f64, target_adg: f64) -> Result<Self, ReportError> {
        if !(cost_of_gain.is_finite() && cost_of_gain >= 0.0) {
            return Err(ReportError::InvalidConfig(format!(
                "cost of gain must be a non-negative amount ($/lb), got {cost_of_gain}"
            )));
        }
        if !(target_adg.is_finite() && (ADG_MIN..=ADG_MAX).contains(&target_adg)) {
            return Err(ReportError::InvalidConfig(format!(
                "target ADG must be between {ADG_MIN} and {ADG_MAX} lbs/day, got {target_adg}"
            )));
        }
        Ok(Self {
            cost_of_gain,
            target_adg,
        })
    }

    pub fn cost_of_gain(&self) -> f64 {
        self.cost_of_gain
    }

    pub fn target_adg(&self) -> f64 {
        self.target_adg
    }
}

impl Default for FeedingAssumptions {
    fn default() -> Self {
        Self {
            cost_of_gain: DEFAULT_COST_OF_GAIN,
            target_adg: DEFAULT_TARGET_ADG,
        }
    }
}

/// Output of the profit calculation for one purchase/sale pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitResult {
    /// $ per head at purchase.
    pub purchase_value: f64,
    /// $ per head at sale.
    pub sale_value: f64,
    /// lbs added per head.
    pub gain: f64,
    /// $/lb of value added.
    pub value_of_gain: f64,
    /// $/lb margin after cost of gain.
    pub return_on_gain: f64,
    /// $ per head.
    pub net_profit: f64,
    /// Estimated feeding period in (fractional) days.
    pub days_on_feed: f64,
}

impl ProfitResult {
    /// Days on feed truncated to whole days (never rounded up).
    pub fn whole_days(&self) -> u32 {
        self.days_on_feed.trunc().max(0.0) as u32
    }
}

/// Resolved settings for fetching and normalizing one report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub endpoint: String,
    /// Read a saved report body instead of calling the endpoint.
    pub input: Option<PathBuf>,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub class_mode: ClassMode,
    pub date_policy: DatePolicy,
    /// Grade field chain override (empty = built-in chain).
    pub grade_fields: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_REPORT_URL.to_string(),
            input: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            class_mode: ClassMode::SteersHeifers,
            date_policy: DatePolicy::FirstSeen,
            grade_fields: Vec::new(),
        }
    }
}
