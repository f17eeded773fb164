//! Error types for schedule validation, solving and loading

use thiserror::Error;

/// Result type for solver operations
pub type XirrResult<T> = Result<T, XirrError>;

/// Coarse classification of a solver failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Convergence,
    Divergence,
}

/// Why a Newton iteration was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceReason {
    /// 1 + rate dropped to zero or below (rate at or below -100%)
    RateBelowDomain,
    /// NPV derivative too close to zero to take a step
    FlatDerivative,
    /// NPV, derivative or next rate was NaN or infinite
    NonFinite,
}

impl std::fmt::Display for DivergenceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            DivergenceReason::RateBelowDomain => "rate fell to -100% or below",
            DivergenceReason::FlatDerivative => "derivative is effectively zero",
            DivergenceReason::NonFinite => "non-finite value",
        };
        f.write_str(msg)
    }
}

/// Errors returned by the XIRR solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XirrError {
    /// Schedule or configuration rejected before iterating
    #[error("Invalid input: {reason}")]
    Validation { reason: String },

    /// Iteration cap exhausted without meeting tolerance
    #[error("No convergence after {iterations} iterations (rate: {rate:.6}, npv: {npv:.2e})")]
    Convergence { iterations: u32, rate: f64, npv: f64 },

    /// Iteration left the valid domain
    #[error("Divergence at iteration {iteration} (rate: {rate:.6}): {reason}")]
    Divergence {
        iteration: u32,
        rate: f64,
        reason: DivergenceReason,
    },
}

impl XirrError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            XirrError::Validation { .. } => ErrorKind::Validation,
            XirrError::Convergence { .. } => ErrorKind::Convergence,
            XirrError::Divergence { .. } => ErrorKind::Divergence,
        }
    }
}

/// Errors from reading cash flow schedules out of CSV
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: cannot parse date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("Schedule '{id}': {source}")]
    Schedule {
        id: String,
        #[source]
        source: XirrError,
    },

    #[error(
        "File holds {} schedules ({}); load them with load_schedules or --grouped",
        .ids.len(),
        .ids.join(", ")
    )]
    MultipleSchedules { ids: Vec<String> },

    #[error("No cash flow rows found")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(XirrError::validation("x").kind(), ErrorKind::Validation);

        let err = XirrError::Convergence { iterations: 50, rate: 0.1, npv: 3.0 };
        assert_eq!(err.kind(), ErrorKind::Convergence);
        assert!(err.to_string().contains("50 iterations"));

        let err = XirrError::Divergence {
            iteration: 3,
            rate: -1.2,
            reason: DivergenceReason::RateBelowDomain,
        };
        assert_eq!(err.kind(), ErrorKind::Divergence);
        assert!(err.to_string().contains("-100%"));
    }

    #[test]
    fn test_multiple_schedules_message() {
        let err = LoadError::MultipleSchedules {
            ids: vec!["a".to_string(), "b".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 schedules (a, b)"));
        assert!(msg.contains("--grouped"));
    }
}
