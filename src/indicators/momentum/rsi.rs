//! RSI (Relative Strength Index) indicator

use crate::common::math;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Calculate RSI indicator
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// Averages are simple means of the last `period` close-to-close changes, so
/// the first defined value is at index `period`. A window with losses but no
/// gains is 0; a window with gains but no losses saturates at 100; a window
/// with neither (flat price) is undefined.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let deltas = math::diff(closes);

    let gains: Vec<f64> = deltas
        .iter()
        .map(|&d| if d.is_nan() { f64::NAN } else { d.max(0.0) })
        .collect();
    let losses: Vec<f64> = deltas
        .iter()
        .map(|&d| if d.is_nan() { f64::NAN } else { (-d).max(0.0) })
        .collect();

    let avg_gains = math::rolling_mean(&gains, period);
    let avg_losses = math::rolling_mean(&losses, period);

    avg_gains
        .iter()
        .zip(&avg_losses)
        .map(|(&avg_gain, &avg_loss)| rsi_from_averages(avg_gain, avg_loss))
        .collect()
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> Vec<f64> {
    calculate_rsi(closes, DEFAULT_RSI_PERIOD)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        return f64::NAN;
    }

    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { f64::NAN };
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
