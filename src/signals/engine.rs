//! Signal engine: classifies every point of an indicator frame per strategy.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::SignalThresholds;
use crate::indicators::error::IndicatorError;
use crate::models::indicators::{IndicatorField, IndicatorFrame};
use crate::models::signal::{SignalFrame, Strategy, TradeSignal};
use crate::signals::rules::{bollinger_signal, macd_signal, rsi_signal};

/// Stateless point-wise classifier.
///
/// There is no position tracking: a strategy emits `Buy` at every point where
/// its buy condition holds, not only where the condition first becomes true.
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    thresholds: SignalThresholds,
}

impl SignalEngine {
    pub fn new(thresholds: SignalThresholds) -> Result<Self, IndicatorError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    /// Add a signal column for every strategy whose indicator columns are
    /// present. Strategies with missing inputs are left out of the frame.
    pub fn evaluate(&self, frame: IndicatorFrame) -> SignalFrame {
        let signals: BTreeMap<Strategy, Vec<TradeSignal>> = Strategy::ALL
            .iter()
            .filter_map(|&strategy| Some((strategy, self.strategy_signals(&frame, strategy)?)))
            .collect();

        debug!(
            points = frame.len(),
            strategies = signals.len(),
            "Evaluated signal frame"
        );
        SignalFrame::new(frame, signals)
    }

    /// Signal column for one strategy, or `None` if its inputs are missing.
    pub fn strategy_signals(
        &self,
        frame: &IndicatorFrame,
        strategy: Strategy,
    ) -> Option<Vec<TradeSignal>> {
        match strategy {
            Strategy::Rsi => {
                let rsi = frame.column(IndicatorField::Rsi)?;
                Some(self.rsi_signals(rsi))
            }
            Strategy::Bollinger => {
                let closes = frame.series().closes();
                let upper = frame.column(IndicatorField::BollingerUpper)?;
                let lower = frame.column(IndicatorField::BollingerLower)?;
                Some(self.bollinger_signals(&closes, upper, lower))
            }
            Strategy::Macd => {
                let macd = frame.column(IndicatorField::Macd)?;
                let signal_line = frame.column(IndicatorField::SignalLine)?;
                Some(self.macd_signals(macd, signal_line))
            }
        }
    }

    pub fn rsi_signals(&self, rsi: &[f64]) -> Vec<TradeSignal> {
        rsi.iter()
            .map(|&value| rsi_signal(value, &self.thresholds))
            .collect()
    }

    pub fn bollinger_signals(&self, closes: &[f64], upper: &[f64], lower: &[f64]) -> Vec<TradeSignal> {
        closes
            .iter()
            .zip(upper)
            .zip(lower)
            .map(|((&close, &upper), &lower)| bollinger_signal(close, upper, lower))
            .collect()
    }

    pub fn macd_signals(&self, macd: &[f64], signal_line: &[f64]) -> Vec<TradeSignal> {
        macd.iter()
            .zip(signal_line)
            .map(|(&macd, &signal)| macd_signal(macd, signal))
            .collect()
    }
}
