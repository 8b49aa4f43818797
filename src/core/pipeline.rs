//! Price series -> indicator frame -> signal frame.

use tracing::debug;

use crate::config::Config;
use crate::indicators::engine::IndicatorEngine;
use crate::indicators::error::IndicatorError;
use crate::models::indicators::{IndicatorFrame, PricePoint, PriceSeries};
use crate::models::signal::SignalFrame;
use crate::signals::engine::SignalEngine;

/// Runs both engines in sequence. Every column of the result has exactly one
/// entry per input point, and the entry at index `i` depends only on points
/// `0..=i`.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    indicators: IndicatorEngine,
    signals: SignalEngine,
}

impl Pipeline {
    pub fn new(indicators: IndicatorEngine, signals: SignalEngine) -> Self {
        Self {
            indicators,
            signals,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, IndicatorError> {
        Ok(Self::new(
            IndicatorEngine::new(config.indicators.clone())?,
            SignalEngine::new(config.thresholds.clone())?,
        ))
    }

    pub fn indicator_engine(&self) -> &IndicatorEngine {
        &self.indicators
    }

    pub fn signal_engine(&self) -> &SignalEngine {
        &self.signals
    }

    pub fn indicators(&self, series: &PriceSeries) -> IndicatorFrame {
        self.indicators.compute(series)
    }

    pub fn run(&self, series: &PriceSeries) -> SignalFrame {
        let frame = self.indicators.compute(series);
        let signals = self.signals.evaluate(frame);
        debug!(points = signals.len(), "Pipeline run complete");
        signals
    }

    /// Validate raw points, then run. Malformed input is rejected as a whole
    /// before anything is computed.
    pub fn run_points(&self, points: Vec<PricePoint>) -> Result<SignalFrame, IndicatorError> {
        let series = PriceSeries::new(points)?;
        Ok(self.run(&series))
    }
}
