//! EMA (Exponential Moving Average) overlay

use crate::common::math;

/// Period of the `ema_10` overlay column.
pub const EMA_OVERLAY_PERIOD: usize = 10;

/// Calculate EMA over closing prices
///
/// Seeded with the first close, so every index is defined.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    math::ewm(closes, period)
}

/// Calculate the 10-period overlay
pub fn calculate_ema_default(closes: &[f64]) -> Vec<f64> {
    calculate_ema(closes, EMA_OVERLAY_PERIOD)
}
