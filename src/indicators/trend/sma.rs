//! SMA (Simple Moving Average) overlay

use crate::common::math;

/// Period of the `sma_20` overlay column.
pub const SMA_OVERLAY_PERIOD: usize = 20;

/// Calculate SMA over closing prices
///
/// `NaN` for the first `period - 1` indices.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    math::rolling_mean(closes, period)
}

/// Calculate the 20-period overlay
pub fn calculate_sma_default(closes: &[f64]) -> Vec<f64> {
    calculate_sma(closes, SMA_OVERLAY_PERIOD)
}
