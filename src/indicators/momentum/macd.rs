//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;

pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

/// MACD line, its signal line, and their difference, index-aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
///
/// All three lines are defined from the first close; early values rest on
/// few observations but are not flagged.
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let fast_ema = math::ewm(closes, fast_period);
    let slow_ema = math::ewm(closes, slow_period);

    let macd = math::subtract(&fast_ema, &slow_ema);
    let signal_line = math::ewm(&macd, signal_period);
    let histogram = math::subtract(&macd, &signal_line);

    MacdSeries {
        macd,
        signal_line,
        histogram,
    }
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(closes: &[f64]) -> MacdSeries {
    calculate_macd(closes, DEFAULT_MACD_FAST, DEFAULT_MACD_SLOW, DEFAULT_MACD_SIGNAL)
}
