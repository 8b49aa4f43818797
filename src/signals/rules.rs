//! Point-wise signal rules.
//!
//! Each rule looks at indicator values for a single index only. An
//! undefined (`NaN`) input always classifies as [`TradeSignal::Hold`].

use std::cmp::Ordering;

use crate::config::SignalThresholds;
use crate::models::signal::TradeSignal;

/// Oversold (below `rsi_oversold`) buys, overbought (above `rsi_overbought`) sells.
pub fn rsi_signal(rsi: f64, thresholds: &SignalThresholds) -> TradeSignal {
    if rsi.is_nan() {
        return TradeSignal::Hold;
    }

    if rsi < thresholds.rsi_oversold {
        TradeSignal::Buy
    } else if rsi > thresholds.rsi_overbought {
        TradeSignal::Sell
    } else {
        TradeSignal::Hold
    }
}

/// Close below the lower band buys, close above the upper band sells.
pub fn bollinger_signal(close: f64, upper: f64, lower: f64) -> TradeSignal {
    if close.is_nan() || upper.is_nan() || lower.is_nan() {
        return TradeSignal::Hold;
    }

    if close < lower {
        TradeSignal::Buy
    } else if close > upper {
        TradeSignal::Sell
    } else {
        TradeSignal::Hold
    }
}

/// MACD above its signal line buys, below sells, exactly equal holds.
pub fn macd_signal(macd: f64, signal_line: f64) -> TradeSignal {
    match macd.partial_cmp(&signal_line) {
        Some(Ordering::Greater) => TradeSignal::Buy,
        Some(Ordering::Less) => TradeSignal::Sell,
        Some(Ordering::Equal) => TradeSignal::Hold,
        // NaN on either side
        None => TradeSignal::Hold,
    }
}
