//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;

pub use indicators::{IndicatorField, IndicatorFrame, IndicatorRow, PricePoint, PriceSeries};
pub use signal::{LatestSignals, SignalFrame, SignalRow, Strategy, StrategyRow, TradeSignal};
