//! Input shape checks shared by series construction and configuration loading.

use crate::indicators::error::IndicatorError;
use crate::models::indicators::PricePoint;

fn check_price(index: usize, field: &'static str, value: f64) -> Result<(), IndicatorError> {
    if !value.is_finite() {
        return Err(IndicatorError::NonFinitePrice { index, field });
    }
    if value < 0.0 {
        return Err(IndicatorError::NegativePrice {
            index,
            field,
            value,
        });
    }
    Ok(())
}

/// Validate a single observation: every price finite and non-negative.
pub fn validate_price_point(index: usize, point: &PricePoint) -> Result<(), IndicatorError> {
    check_price(index, "open", point.open)?;
    check_price(index, "high", point.high)?;
    check_price(index, "low", point.low)?;
    check_price(index, "close", point.close)?;
    if let Some(volume) = point.volume {
        check_price(index, "volume", volume)?;
    }
    Ok(())
}

/// Validate a whole series: every point well-formed and timestamps strictly
/// increasing. An empty slice is valid.
pub fn validate_price_points(points: &[PricePoint]) -> Result<(), IndicatorError> {
    for (index, point) in points.iter().enumerate() {
        validate_price_point(index, point)?;
    }

    for (offset, pair) in points.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(IndicatorError::NonIncreasingTimestamp {
                index: offset + 1,
                timestamp: pair[1].timestamp,
                previous: pair[0].timestamp,
            });
        }
    }
    Ok(())
}

pub fn validate_period(name: &str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(())
}

/// Band multipliers must be finite and non-negative so that upper >= lower.
pub fn validate_multiplier(name: &str, value: f64) -> Result<(), IndicatorError> {
    if !value.is_finite() || value < 0.0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Oscillator thresholds must lie on the 0-100 scale.
pub fn validate_oscillator_level(name: &str, value: f64) -> Result<(), IndicatorError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} must be within 0..=100, got {}",
            name, value
        )));
    }
    Ok(())
}
