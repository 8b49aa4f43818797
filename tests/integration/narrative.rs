//! Integration tests for the chat-completions narrative analyst.

use chrono::DateTime;
use coinvision::core::Pipeline;
use coinvision::models::{PricePoint, PriceSeries};
use coinvision::services::{narrative_records, NarrativeAnalyst, NarrativeError, OpenAiAnalyst};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_series(count: usize) -> PriceSeries {
    let points = (0..count)
        .map(|i| {
            let close = 2_000.0 + (i as f64 * 0.6).sin() * 40.0;
            let ts = DateTime::from_timestamp(1_704_067_200 + i as i64 * 86_400, 0).unwrap();
            PricePoint::new(ts, close, close + 5.0, close - 5.0, close).with_volume(42.0)
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

fn analyst(server: &MockServer) -> OpenAiAnalyst {
    OpenAiAnalyst::new(reqwest::Client::new(), server.uri(), "test-key", "gpt-4")
}

#[test]
fn records_use_analyst_field_names() {
    let frame = Pipeline::default().indicators(&sample_series(25));
    let records = narrative_records(&frame);
    assert_eq!(records.len(), 25);

    let first: Value = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(first["Date"], 1_704_067_200_000_i64);
    assert_eq!(first["Volume"], 42.0);
    assert!(first["SMA_20"].is_null());
    assert!(first["RSI"].is_null());
    assert!(first["EMA_10"].is_number());
    assert!(first["MACD"].is_number());
    assert!(first["Signal_Line"].is_number());

    let last: Value = serde_json::to_value(&records[24]).unwrap();
    assert!(last["SMA_20"].is_number());
    assert!(last["Bollinger_Upper"].is_number());
    assert!(last["Bollinger_Lower"].is_number());
    assert!(last["RSI"].is_number());
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("\"model\":\"gpt-4\""))
        .and(body_string_contains("Describe the range"))
        .and(body_string_contains("Signal_Line"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Price is consolidating." },
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let frame = Pipeline::default().indicators(&sample_series(30));
    let text = analyst(&server)
        .analyze("Describe the range", &narrative_records(&frame))
        .await
        .expect("analysis succeeds");
    assert_eq!(text, "Price is consolidating.");
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = analyst(&server).analyze("hi", &[]).await.unwrap_err();
    match err {
        NarrativeError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_choices_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = analyst(&server).analyze("hi", &[]).await.unwrap_err();
    assert!(matches!(err, NarrativeError::EmptyResponse));
}
