//! Metrics engine error types

use thiserror::Error;

/// Errors that can occur in the metrics engine
///
/// Data conditions (empty series, missing values, negative deltas) are never
/// errors; only caller mistakes end up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// Rolling window must cover at least one record
    #[error("Invalid window size {0}: must be at least 1")]
    InvalidWindow(usize),

    /// Field name does not name a numeric record field
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Result type alias for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetricsError::InvalidWindow(0);
        assert_eq!(err.to_string(), "Invalid window size 0: must be at least 1");

        let err = MetricsError::UnknownMetric("hospitalizations".to_string());
        assert_eq!(err.to_string(), "Unknown metric: hospitalizations");
    }
}
