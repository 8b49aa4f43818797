//! Bollinger Bands indicator

use crate::common::math;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_K: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (k * sample standard deviation)
/// Lower Band = Middle - (k * sample standard deviation)
///
/// Undefined for the first `period - 1` indices. For `k >= 0` the upper band
/// never falls below the lower band.
pub fn calculate_bollinger_bands(closes: &[f64], period: usize, k: f64) -> BollingerBands {
    let middle = math::rolling_mean(closes, period);
    let std = math::rolling_std(closes, period);

    let upper = middle.iter().zip(&std).map(|(m, s)| m + k * s).collect();
    let lower = middle.iter().zip(&std).map(|(m, s)| m - k * s).collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn calculate_bollinger_bands_default(closes: &[f64]) -> BollingerBands {
    calculate_bollinger_bands(closes, DEFAULT_BOLLINGER_PERIOD, DEFAULT_BOLLINGER_K)
}
