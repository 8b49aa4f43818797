//! Indicator engine: augments a price series with indicator columns.

use tracing::debug;

use crate::config::IndicatorConfig;
use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{calculate_macd, calculate_rsi};
use crate::indicators::trend::{calculate_ema_default, calculate_sma_default};
use crate::indicators::volatility::calculate_bollinger_bands;
use crate::models::indicators::{IndicatorField, IndicatorFrame, PriceSeries};

/// Computes indicator columns with a fixed, validated configuration.
///
/// Each `with_*` method adds its own columns and reads nothing but the
/// frame's closes, so indicators can be computed in any order or subset.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Every column: overlays, RSI, Bollinger Bands and MACD.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorFrame {
        let frame = IndicatorFrame::new(series.clone());
        let frame = self.with_overlays(frame);
        let frame = self.with_rsi(frame);
        let frame = self.with_bollinger(frame);
        let frame = self.with_macd(frame);

        debug!(
            points = frame.len(),
            columns = frame.fields().count(),
            "Computed indicator frame"
        );
        frame
    }

    /// `sma_20` and `ema_10`.
    pub fn with_overlays(&self, mut frame: IndicatorFrame) -> IndicatorFrame {
        let closes = frame.series().closes();
        frame.insert_aligned(IndicatorField::Sma20, calculate_sma_default(&closes));
        frame.insert_aligned(IndicatorField::Ema10, calculate_ema_default(&closes));
        frame
    }

    pub fn with_rsi(&self, mut frame: IndicatorFrame) -> IndicatorFrame {
        let closes = frame.series().closes();
        frame.insert_aligned(
            IndicatorField::Rsi,
            calculate_rsi(&closes, self.config.rsi_period),
        );
        frame
    }

    pub fn with_bollinger(&self, mut frame: IndicatorFrame) -> IndicatorFrame {
        let closes = frame.series().closes();
        let bands = calculate_bollinger_bands(
            &closes,
            self.config.bollinger_period,
            self.config.bollinger_k,
        );
        frame.insert_aligned(IndicatorField::BollingerUpper, bands.upper);
        frame.insert_aligned(IndicatorField::BollingerLower, bands.lower);
        frame
    }

    pub fn with_macd(&self, mut frame: IndicatorFrame) -> IndicatorFrame {
        let closes = frame.series().closes();
        let macd = calculate_macd(
            &closes,
            self.config.macd_fast,
            self.config.macd_slow,
            self.config.macd_signal,
        );
        frame.insert_aligned(IndicatorField::Macd, macd.macd);
        frame.insert_aligned(IndicatorField::SignalLine, macd.signal_line);
        frame
    }
}
