//! Narrative analysis collaborator.
//!
//! Serializes an indicator frame into flat records and hands them, together
//! with a prompt, to a text-generating analyst. The returned text is passed
//! through untouched; nothing here feeds back into indicator or signal values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::NarrativeConfig;
use crate::models::indicators::IndicatorFrame;

const TEMPERATURE: f64 = 0.4;
const MAX_TOKENS: u32 = 1000;
const PRESENCE_PENALTY: f64 = 0.2;

const SYSTEM_PROMPT: &str = "You are a cryptocurrency market analyst working on an educational \
simulation. You receive daily price history as JSON records with the fields Date (epoch \
milliseconds), Open, High, Low, Close, Volume, SMA_20, EMA_10, RSI, Bollinger_Upper, \
Bollinger_Lower, MACD and Signal_Line; null means the value is not yet defined. Describe the \
trend, volatility and notable support or resistance levels, interpret what RSI, MACD and the \
Bollinger Bands say about the current state of the market, and outline possible scenarios with \
hypothetical price levels. Do not give financial advice and do not tell the reader to buy, sell \
or invest. Assume the reader already knows the indicators. Answer in at most two paragraphs.";

/// One row of an indicator frame, keyed the way the analyst prompt expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRecord {
    #[serde(rename = "Date")]
    pub date: i64,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: Option<f64>,
    #[serde(rename = "SMA_20")]
    pub sma_20: Option<f64>,
    #[serde(rename = "EMA_10")]
    pub ema_10: Option<f64>,
    #[serde(rename = "RSI")]
    pub rsi: Option<f64>,
    #[serde(rename = "Bollinger_Upper")]
    pub bollinger_upper: Option<f64>,
    #[serde(rename = "Bollinger_Lower")]
    pub bollinger_lower: Option<f64>,
    #[serde(rename = "MACD")]
    pub macd: Option<f64>,
    #[serde(rename = "Signal_Line")]
    pub signal_line: Option<f64>,
}

pub fn narrative_records(frame: &IndicatorFrame) -> Vec<NarrativeRecord> {
    frame
        .rows()
        .into_iter()
        .map(|row| NarrativeRecord {
            date: row.timestamp.timestamp_millis(),
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            sma_20: row.sma_20,
            ema_10: row.ema_10,
            rsi: row.rsi,
            bollinger_upper: row.bollinger_upper,
            bollinger_lower: row.bollinger_lower,
            macd: row.macd,
            signal_line: row.signal_line,
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("failed to serialize price data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("narrative request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("narrative service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("narrative service returned no content")]
    EmptyResponse,
}

#[async_trait]
pub trait NarrativeAnalyst: Send + Sync {
    async fn analyze(
        &self,
        prompt: &str,
        records: &[NarrativeRecord],
    ) -> Result<String, NarrativeError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions backed analyst.
#[derive(Debug, Clone)]
pub struct OpenAiAnalyst {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAnalyst {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &NarrativeConfig) -> Option<Self> {
        let api_key = config.api_key.as_ref()?;
        Some(Self::new(
            reqwest::Client::new(),
            config.base_url.clone(),
            api_key.clone(),
            config.model.clone(),
        ))
    }
}

#[async_trait]
impl NarrativeAnalyst for OpenAiAnalyst {
    async fn analyze(
        &self,
        prompt: &str,
        records: &[NarrativeRecord],
    ) -> Result<String, NarrativeError> {
        let data = serde_json::to_string(records)?;
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("{}\n\nPrice data: {}", prompt, data) },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "presence_penalty": PRESENCE_PENALTY,
        });

        debug!(model = %self.model, records = records.len(), "Requesting narrative analysis");
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(NarrativeError::EmptyResponse)
    }
}
