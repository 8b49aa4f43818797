//! Unit tests for market data types and the in-memory provider

use std::str::FromStr;

use chrono::DateTime;
use coinvision::models::{PricePoint, PriceSeries};
use coinvision::services::{InMemoryMarketDataProvider, MarketDataError, MarketDataProvider, Period};

fn create_series(count: usize) -> PriceSeries {
    let points = (0..count)
        .map(|i| {
            let ts = DateTime::from_timestamp(1_600_000_000 + i as i64 * 86_400, 0).unwrap();
            let close = 100.0 + i as f64;
            PricePoint::new(ts, close, close, close, close)
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

#[test]
fn test_period_parsing() {
    assert_eq!(Period::from_str("1mo"), Ok(Period::OneMonth));
    assert_eq!(Period::from_str("3MO"), Ok(Period::ThreeMonths));
    assert_eq!(Period::from_str("6mo"), Ok(Period::SixMonths));
    assert_eq!(Period::from_str("1y"), Ok(Period::OneYear));
    assert_eq!(Period::from_str("5y"), Ok(Period::FiveYears));
    assert!(Period::from_str("2w").is_err());
    assert_eq!(Period::default(), Period::OneMonth);
}

#[test]
fn test_period_serialization() {
    assert_eq!(serde_json::to_string(&Period::OneYear).unwrap(), "\"1y\"");
    let parsed: Period = serde_json::from_str("\"6mo\"").unwrap();
    assert_eq!(parsed, Period::SixMonths);
    assert_eq!(Period::FiveYears.to_string(), "5y");
}

#[test]
fn test_retryable_errors() {
    assert!(MarketDataError::Status { status: 503 }.is_retryable());
    assert!(MarketDataError::Status { status: 429 }.is_retryable());
    assert!(!MarketDataError::Status { status: 400 }.is_retryable());
    assert!(!MarketDataError::UnknownSymbol("X".to_string()).is_retryable());
    assert!(!MarketDataError::Provider("bad".to_string()).is_retryable());
}

#[tokio::test]
async fn test_in_memory_provider_returns_period_tail() {
    let provider = InMemoryMarketDataProvider::new().with_series("BTC-USD", create_series(400));

    let month = provider.fetch("BTC-USD", Period::OneMonth).await.unwrap();
    assert_eq!(month.len(), 30);
    assert_eq!(month.last().unwrap().close, 499.0);

    let year = provider.fetch("BTC-USD", Period::OneYear).await.unwrap();
    assert_eq!(year.len(), 365);

    let all = provider.fetch("BTC-USD", Period::FiveYears).await.unwrap();
    assert_eq!(all.len(), 400);
}

#[tokio::test]
async fn test_in_memory_provider_unknown_symbol() {
    let provider = InMemoryMarketDataProvider::new();
    let err = provider.fetch("DOGE-USD", Period::OneMonth).await.unwrap_err();
    assert!(matches!(err, MarketDataError::UnknownSymbol(symbol) if symbol == "DOGE-USD"));
}
