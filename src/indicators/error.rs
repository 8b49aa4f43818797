use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rejections raised before any indicator is computed.
///
/// Degenerate arithmetic (zero volatility, zero average loss, short input)
/// is never an error; it shows up as `NaN` or a saturated value instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("non-finite {field} at index {index}")]
    NonFinitePrice { index: usize, field: &'static str },

    #[error("negative {field} ({value}) at index {index}")]
    NegativePrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("timestamp {timestamp} at index {index} does not follow previous timestamp {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("column {field} has {actual} values, series has {expected}")]
    MisalignedColumn {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
