//! Error types.
//!
//! - `ReportError`: the domain taxonomy shared by fetch, normalization, and
//!   profit calculation. It is `Clone` so a failed fetch can be cached and
//!   shown again until the snapshot expires.
//! - `AppError`: the process-level error of the `vog` binary (exit code +
//!   message). Every `ReportError` converts into one.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    /// Network, timeout, HTTP status, or body decoding failure.
    #[error("Report service unavailable: {0}")]
    Transport(String),

    /// The upstream report contained zero records.
    #[error("Market report is empty.")]
    EmptySource,

    /// Records were present but none survived classification and field checks.
    #[error("No valid Steer/Heifer data found in the market report.")]
    NoMatchingData,

    /// The sale bracket is not heavier than the purchase bracket.
    #[error(
        "Sale weight ({sale_weight:.0} lbs) must be greater than purchase weight ({purchase_weight:.0} lbs). Choose a heavier sale bracket."
    )]
    InvalidGain { purchase_weight: f64, sale_weight: f64 },

    /// The report credential could not be resolved from the environment.
    #[error("Missing report credential: {0}")]
    MissingCredential(String),

    /// A feeding assumption or other setting is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReportError {
    /// Whether the user can fix this by changing a selection (no re-fetch needed).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReportError::InvalidGain { .. } | ReportError::InvalidConfig(_))
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::MissingCredential(_)
            | ReportError::InvalidConfig(_)
            | ReportError::InvalidGain { .. } => 2,
            ReportError::EmptySource | ReportError::NoMatchingData => 3,
            ReportError::Transport(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_errors_map_to_exit_codes() {
        let app: AppError = ReportError::EmptySource.into();
        assert_eq!(app.exit_code(), 3);

        let app: AppError = ReportError::Transport("timed out".to_string()).into();
        assert_eq!(app.exit_code(), 4);
        assert!(app.to_string().contains("timed out"));

        let app: AppError = ReportError::MissingCredential("USDA_API_KEY".to_string()).into();
        assert_eq!(app.exit_code(), 2);
    }

    #[test]
    fn only_selection_errors_are_recoverable() {
        let gain = ReportError::InvalidGain {
            purchase_weight: 700.0,
            sale_weight: 600.0,
        };
        assert!(gain.is_recoverable());
        assert!(!ReportError::NoMatchingData.is_recoverable());
        assert!(!ReportError::Transport("down".to_string()).is_recoverable());
    }
}
