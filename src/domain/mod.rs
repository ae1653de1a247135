//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalization settings (`ClassMode`, `DatePolicy`, `ReportConfig`)
//! - the normalized table (`MarketEntry`, `NormalizedReport`)
//! - profit inputs and outputs (`FeedingAssumptions`, `ProfitResult`)

pub mod types;

pub use types::*;
