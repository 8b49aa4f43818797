use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::indicators::{IndicatorField, IndicatorFrame, IndicatorRow};

/// Categorical output of a signal rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TradeSignal::Buy => "Buy",
            TradeSignal::Sell => "Sell",
            TradeSignal::Hold => "Hold",
        };
        f.write_str(label)
    }
}

/// The rule-based strategies the signal engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Rsi,
    Bollinger,
    Macd,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Rsi, Strategy::Bollinger, Strategy::Macd];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Rsi => "rsi",
            Strategy::Bollinger => "bollinger",
            Strategy::Macd => "macd",
        }
    }

    /// Name of the categorical column this strategy produces.
    pub fn signal_field(&self) -> &'static str {
        match self {
            Strategy::Rsi => "rsi_signal",
            Strategy::Bollinger => "bollinger_signal",
            Strategy::Macd => "macd_signal",
        }
    }

    /// Indicator columns the strategy's rule reads.
    pub fn indicator_fields(&self) -> &'static [IndicatorField] {
        match self {
            Strategy::Rsi => &[IndicatorField::Rsi],
            Strategy::Bollinger => &[IndicatorField::BollingerUpper, IndicatorField::BollingerLower],
            Strategy::Macd => &[IndicatorField::Macd, IndicatorField::SignalLine],
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsi" => Ok(Strategy::Rsi),
            "bollinger" | "bollinger_bands" => Ok(Strategy::Bollinger),
            "macd" => Ok(Strategy::Macd),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// An [`IndicatorFrame`] plus one categorical column per evaluated strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    indicators: IndicatorFrame,
    signals: BTreeMap<Strategy, Vec<TradeSignal>>,
}

impl SignalFrame {
    pub(crate) fn new(
        indicators: IndicatorFrame,
        signals: BTreeMap<Strategy, Vec<TradeSignal>>,
    ) -> Self {
        debug_assert!(signals.values().all(|s| s.len() == indicators.len()));
        Self {
            indicators,
            signals,
        }
    }

    pub fn indicators(&self) -> &IndicatorFrame {
        &self.indicators
    }

    pub fn into_indicators(self) -> IndicatorFrame {
        self.indicators
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn signals(&self, strategy: Strategy) -> Option<&[TradeSignal]> {
        self.signals.get(&strategy).map(Vec::as_slice)
    }

    pub fn signal(&self, strategy: Strategy, index: usize) -> Option<TradeSignal> {
        self.signals(strategy)
            .and_then(|signals| signals.get(index).copied())
    }

    pub fn rows(&self) -> Vec<SignalRow> {
        self.indicators
            .rows()
            .into_iter()
            .enumerate()
            .map(|(index, indicators)| SignalRow {
                indicators,
                rsi_signal: self.signal(Strategy::Rsi, index),
                bollinger_signal: self.signal(Strategy::Bollinger, index),
                macd_signal: self.signal(Strategy::Macd, index),
            })
            .collect()
    }

    /// Signals at the most recent point, or `None` for an empty frame.
    pub fn latest_signals(&self) -> Option<LatestSignals> {
        let index = self.len().checked_sub(1)?;
        let point = self.indicators.series().points().get(index)?;
        Some(LatestSignals {
            timestamp: point.timestamp,
            close: point.close,
            rsi_signal: self.signal(Strategy::Rsi, index),
            bollinger_signal: self.signal(Strategy::Bollinger, index),
            macd_signal: self.signal(Strategy::Macd, index),
        })
    }

    /// Presentation table for one strategy: the points where every indicator
    /// the strategy reads is defined, newest first.
    ///
    /// Warm-up points are left out for every strategy, not only RSI: the first
    /// `rsi_period` rows of the RSI table and the first `bollinger_period - 1`
    /// rows of the Bollinger table never appear, even though their signal
    /// column holds `Hold` there. MACD is defined from the first point, so its
    /// table has one row per point. Use [`SignalFrame::rows`] for the full,
    /// index-aligned view including warm-up.
    pub fn strategy_table(&self, strategy: Strategy) -> Vec<StrategyRow> {
        let Some(signals) = self.signals(strategy) else {
            return Vec::new();
        };
        let points = self.indicators.series().points();

        let mut rows: Vec<StrategyRow> = points
            .iter()
            .zip(signals)
            .enumerate()
            .filter_map(|(index, (point, &signal))| {
                let values = strategy
                    .indicator_fields()
                    .iter()
                    .map(|&field| Some((field, self.indicators.value(field, index)?)))
                    .collect::<Option<BTreeMap<_, _>>>()?;
                Some(StrategyRow {
                    timestamp: point.timestamp,
                    close: point.close,
                    values,
                    signal,
                })
            })
            .collect();
        rows.reverse();
        rows
    }
}

/// Row view of a [`SignalFrame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    #[serde(flatten)]
    pub indicators: IndicatorRow,
    pub rsi_signal: Option<TradeSignal>,
    pub bollinger_signal: Option<TradeSignal>,
    pub macd_signal: Option<TradeSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSignals {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi_signal: Option<TradeSignal>,
    pub bollinger_signal: Option<TradeSignal>,
    pub macd_signal: Option<TradeSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub values: BTreeMap<IndicatorField, f64>,
    pub signal: TradeSignal,
}
