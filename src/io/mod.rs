//! Input/output helpers.
//!
//! - field-resolution rules (`rules`)
//! - report normalization (`ingest`)
//! - table exports (CSV) (`export`)
//! - raw report JSON save/load for offline runs (`snapshot`)

pub mod export;
pub mod ingest;
pub mod rules;
pub mod snapshot;

pub use export::*;
pub use ingest::*;
pub use rules::*;
pub use snapshot::*;
