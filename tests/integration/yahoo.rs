//! Integration tests for the Yahoo Finance provider against a mocked chart API.

use std::time::Duration;

use coinvision::services::{MarketDataError, MarketDataProvider, Period, YahooFinanceProvider};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DAY: i64 = 86_400;
const START: i64 = 1_704_067_200;

fn chart_body(timestamps: &[i64], closes: &[Option<f64>]) -> Value {
    let opens: Vec<Option<f64>> = closes.iter().map(|c| c.map(|v| v - 1.0)).collect();
    let highs: Vec<Option<f64>> = closes.iter().map(|c| c.map(|v| v + 2.0)).collect();
    let lows: Vec<Option<f64>> = closes.iter().map(|c| c.map(|v| v - 2.0)).collect();
    let volumes: Vec<Option<f64>> = closes.iter().map(|c| c.map(|_| 1_000.0)).collect();

    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "BTC-USD", "currency": "USD" },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{
                        "open": opens,
                        "high": highs,
                        "low": lows,
                        "close": closes,
                        "volume": volumes
                    }]
                }
            }],
            "error": null
        }
    })
}

fn provider(server: &MockServer) -> YahooFinanceProvider {
    YahooFinanceProvider::with_client(server.uri(), reqwest::Client::new())
        .with_retry(2, Duration::from_millis(5))
}

#[tokio::test]
async fn fetches_daily_history() {
    let server = MockServer::start().await;
    let timestamps: Vec<i64> = (0..5).map(|i| START + i * DAY).collect();
    let closes = vec![Some(100.0), Some(101.0), Some(102.5), Some(99.0), Some(98.0)];

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .and(query_param("range", "3mo"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&timestamps, &closes)))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider(&server)
        .fetch("BTC-USD", Period::ThreeMonths)
        .await
        .expect("fetch succeeds");

    assert_eq!(series.len(), 5);
    assert_eq!(series.closes(), vec![100.0, 101.0, 102.5, 99.0, 98.0]);
    let first = &series.points()[0];
    assert_eq!(first.timestamp.timestamp(), START);
    assert_eq!(first.open, 99.0);
    assert_eq!(first.high, 102.0);
    assert_eq!(first.volume, Some(1_000.0));
}

#[tokio::test]
async fn drops_sessions_without_close() {
    let server = MockServer::start().await;
    let timestamps: Vec<i64> = (0..4).map(|i| START + i * DAY).collect();
    let closes = vec![Some(100.0), None, Some(102.0), Some(103.0)];

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ETH-USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&timestamps, &closes)))
        .mount(&server)
        .await;

    let series = provider(&server)
        .fetch("ETH-USD", Period::OneMonth)
        .await
        .unwrap();
    assert_eq!(series.closes(), vec![100.0, 102.0, 103.0]);
}

#[tokio::test]
async fn drops_repeated_live_session() {
    let server = MockServer::start().await;
    let timestamps = vec![START, START + DAY, START + 2 * DAY, START + 2 * DAY];
    let closes = vec![Some(100.0), Some(101.0), Some(102.0), Some(102.4)];

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&timestamps, &closes)))
        .mount(&server)
        .await;

    let series = provider(&server)
        .fetch("BTC-USD", Period::OneMonth)
        .await
        .unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.last().unwrap().close, 102.0);
}

#[tokio::test]
async fn not_found_is_unknown_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE-USD"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch("NOPE-USD", Period::OneMonth)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::UnknownSymbol(symbol) if symbol == "NOPE-USD"));
}

#[tokio::test]
async fn empty_result_is_unknown_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/XYZ-USD"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "chart": { "result": [], "error": null } })),
        )
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch("XYZ-USD", Period::OneMonth)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::UnknownSymbol(_)));
}

#[tokio::test]
async fn chart_error_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Bad Request", "description": "Invalid input - interval" }
            }
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch("BTC-USD", Period::OneMonth)
        .await
        .unwrap_err();
    match err {
        MarketDataError::Provider(message) => assert!(message.contains("Invalid input")),
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn retries_server_errors() {
    let server = MockServer::start().await;
    let timestamps: Vec<i64> = (0..3).map(|i| START + i * DAY).collect();
    let closes = vec![Some(10.0), Some(11.0), Some(12.0)];

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&timestamps, &closes)))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider(&server)
        .fetch("BTC-USD", Period::OneMonth)
        .await
        .expect("succeeds after retry");
    assert_eq!(series.len(), 3);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch("BTC-USD", Period::OneMonth)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Status { status: 500 }));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch("BTC-USD", Period::OneMonth)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Status { status: 400 }));
}
