//! Unit tests for signal frame views

use std::str::FromStr;

use chrono::DateTime;
use coinvision::core::Pipeline;
use coinvision::models::{IndicatorField, PricePoint, PriceSeries, Strategy, TradeSignal};

fn create_series(closes: &[f64]) -> PriceSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let ts = DateTime::from_timestamp(1_700_000_000 + i as i64 * 86_400, 0).unwrap();
            PricePoint::new(ts, close, close, close, close).with_volume(1_000.0)
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

fn wave(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + (i as f64 * 0.5).sin() * 8.0)
        .collect()
}

#[test]
fn test_strategy_parsing() {
    assert_eq!(Strategy::from_str("rsi"), Ok(Strategy::Rsi));
    assert_eq!(Strategy::from_str("MACD"), Ok(Strategy::Macd));
    assert_eq!(Strategy::from_str("bollinger"), Ok(Strategy::Bollinger));
    assert_eq!(Strategy::from_str("bollinger_bands"), Ok(Strategy::Bollinger));
    assert!(Strategy::from_str("stochastic").is_err());
}

#[test]
fn test_strategy_signal_fields() {
    assert_eq!(Strategy::Rsi.signal_field(), "rsi_signal");
    assert_eq!(Strategy::Bollinger.signal_field(), "bollinger_signal");
    assert_eq!(Strategy::Macd.signal_field(), "macd_signal");
    assert_eq!(
        Strategy::Macd.indicator_fields(),
        &[IndicatorField::Macd, IndicatorField::SignalLine]
    );
}

#[test]
fn test_trade_signal_serialization() {
    assert_eq!(serde_json::to_string(&TradeSignal::Buy).unwrap(), "\"Buy\"");
    assert_eq!(TradeSignal::Hold.to_string(), "Hold");
    assert_eq!(serde_json::to_string(&Strategy::Bollinger).unwrap(), "\"bollinger\"");
}

#[test]
fn test_latest_signals() {
    let closes = wave(40);
    let frame = Pipeline::default().run(&create_series(&closes));
    let latest = frame.latest_signals().unwrap();

    assert_eq!(latest.close, closes[39]);
    assert_eq!(latest.rsi_signal, frame.signal(Strategy::Rsi, 39));
    assert_eq!(latest.bollinger_signal, frame.signal(Strategy::Bollinger, 39));
    assert_eq!(latest.macd_signal, frame.signal(Strategy::Macd, 39));
}

#[test]
fn test_latest_signals_empty() {
    let frame = Pipeline::default().run(&PriceSeries::empty());
    assert!(frame.latest_signals().is_none());
}

#[test]
fn test_strategy_table_drops_undefined_rows_newest_first() {
    let frame = Pipeline::default().run(&create_series(&wave(40)));

    let rsi_table = frame.strategy_table(Strategy::Rsi);
    assert_eq!(rsi_table.len(), 40 - 14);
    assert!(rsi_table
        .windows(2)
        .all(|pair| pair[0].timestamp > pair[1].timestamp));
    assert!(rsi_table
        .iter()
        .all(|row| row.values.contains_key(&IndicatorField::Rsi)));

    let bollinger_table = frame.strategy_table(Strategy::Bollinger);
    assert_eq!(bollinger_table.len(), 40 - 19);

    let macd_table = frame.strategy_table(Strategy::Macd);
    assert_eq!(macd_table.len(), 40);
    assert_eq!(macd_table[0].signal, frame.signal(Strategy::Macd, 39).unwrap());
}

#[test]
fn test_rows_carry_prices_and_signals() {
    let frame = Pipeline::default().run(&create_series(&wave(25)));
    let rows = frame.rows();

    assert_eq!(rows.len(), 25);
    assert_eq!(rows[0].indicators.volume, Some(1_000.0));
    assert_eq!(rows[0].rsi_signal, Some(TradeSignal::Hold));
    assert!(rows.iter().all(|r| r.macd_signal.is_some()));

    let json = serde_json::to_value(&rows[24]).unwrap();
    assert!(json.get("close").is_some());
    assert!(json.get("sma_20").is_some());
    assert!(json.get("rsi_signal").is_some());
}
