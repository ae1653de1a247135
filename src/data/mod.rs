//! Report sources and the cached snapshot.

pub mod cache;
pub mod usda;

pub use cache::{ReportCache, ReportOutcome};
pub use usda::{FileSource, ReportSource, UsdaClient};
