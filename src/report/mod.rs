//! Reporting utilities: formatted terminal output for tables and profit results.

pub mod format;

pub use format::*;
