//! Command-line parsing for the feeder-cattle value-of-gain tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the normalization/calculation code. Every numeric setting can
//! also come from the environment (or a `.env` file).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    ClassMode, DEFAULT_CACHE_TTL_SECS, DEFAULT_COST_OF_GAIN, DEFAULT_REPORT_URL,
    DEFAULT_TARGET_ADG, DEFAULT_TIMEOUT_SECS, DatePolicy, FeedingAssumptions, ReportConfig,
};
use crate::error::ReportError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "vog", version, about = "Feeder cattle value-of-gain calculator (USDA AMS auction data)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI.
    Tui(TuiArgs),
    /// Print the normalized table (optionally narrowed by sex/grade).
    Table(TableArgs),
    /// Compute VOG/ROG/net profit for a purchase and a sale bracket.
    Calc(CalcArgs),
    /// Export the normalized table to CSV.
    Export(ExportArgs),
    /// Save the raw report body to JSON for offline runs (`--input`).
    Save(ExportArgs),
}

/// Where the report comes from and how it is normalized.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Report endpoint.
    #[arg(long, env = "USDA_REPORT_URL", default_value = DEFAULT_REPORT_URL)]
    pub endpoint: String,

    /// Read a saved report JSON instead of calling the endpoint.
    #[arg(long, value_name = "JSON")]
    pub input: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, env = "VOG_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// How long a fetched report is reused before re-querying (seconds).
    #[arg(long, env = "VOG_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Which animal classes to keep.
    #[arg(long, value_enum, default_value_t = ClassMode::SteersHeifers)]
    pub class_mode: ClassMode,

    /// How the working report date is chosen.
    #[arg(long, value_enum, default_value_t = DatePolicy::FirstSeen)]
    pub date_policy: DatePolicy,

    /// Grade field chain, highest priority first (e.g. `frame_muscle,grade`).
    #[arg(long, value_delimiter = ',')]
    pub grade_fields: Vec<String>,
}

/// Feeding assumptions.
#[derive(Debug, Args, Clone)]
pub struct FeedArgs {
    /// Cost of gain ($/lb).
    #[arg(long, env = "VOG_COST_OF_GAIN", default_value_t = DEFAULT_COST_OF_GAIN)]
    pub cog: f64,

    /// Target average daily gain (lbs/day, 0.5-4.0).
    #[arg(long, env = "VOG_TARGET_ADG", default_value_t = DEFAULT_TARGET_ADG)]
    pub adg: f64,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub feed: FeedArgs,
}

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only show this sex (Steers, Heifers, ...).
    #[arg(long)]
    pub sex: Option<String>,

    /// Only show this grade (case-insensitive).
    #[arg(long)]
    pub grade: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CalcArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub feed: FeedArgs,

    /// Sex of the slice (Steers, Heifers, ...).
    #[arg(long)]
    pub sex: String,

    /// Grade of the slice (case-insensitive).
    #[arg(long)]
    pub grade: String,

    /// Purchase weight-range label (e.g. `500-600`).
    #[arg(long)]
    pub buy: String,

    /// Sale weight-range label (e.g. `700-800`).
    #[arg(long)]
    pub sell: String,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

impl SourceArgs {
    pub fn to_config(&self) -> ReportConfig {
        ReportConfig {
            endpoint: self.endpoint.clone(),
            input: self.input.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            class_mode: self.class_mode,
            date_policy: self.date_policy,
            grade_fields: self
                .grade_fields
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }
}

impl FeedArgs {
    pub fn to_assumptions(&self) -> Result<FeedingAssumptions, ReportError> {
        FeedingAssumptions::new(self.cog, self.adg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calc_arguments_parse() {
        let cli = Cli::try_parse_from([
            "vog", "calc", "--input", "report.json", "--sex", "steers", "--grade", "1", "--buy", "500-600",
            "--sell", "700-800", "--cog", "0.95", "--adg", "2.5",
        ])
        .unwrap();

        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        assert_eq!(args.buy, "500-600");
        let assumptions = args.feed.to_assumptions().unwrap();
        assert!((assumptions.cost_of_gain() - 0.95).abs() < 1e-12);
        assert_eq!(args.source.to_config().input, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn grade_fields_split_on_commas() {
        let cli = Cli::try_parse_from(["vog", "table", "--grade-fields", "grade, frame_muscle,"]).unwrap();
        let Command::Table(args) = cli.command else {
            panic!("expected table");
        };
        let config = args.source.to_config();
        assert_eq!(config.grade_fields, vec!["grade".to_string(), "frame_muscle".to_string()]);
    }

    #[test]
    fn out_of_range_adg_is_rejected() {
        let feed = FeedArgs { cog: 1.0, adg: 6.0 };
        assert!(matches!(feed.to_assumptions(), Err(ReportError::InvalidConfig(_))));
    }
}
