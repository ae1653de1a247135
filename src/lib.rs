//! `feeder-vog` library crate.
//!
//! The binary (`vog`) is a thin wrapper around this library so that:
//!
//! - the normalizer and profit calculator are testable without spawning processes
//! - the selection surface (`slice`) can back any front-end, not just the TUI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod profit;
pub mod report;
pub mod slice;
pub mod tui;
