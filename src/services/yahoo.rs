//! Yahoo Finance chart API market data provider

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::indicators::{PricePoint, PriceSeries};
use crate::services::market_data::{MarketDataError, MarketDataProvider, Period};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; coinvision/0.1)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_MIN_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

// Yahoo pads missing sessions with nulls, hence Option per entry.
#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct YahooFinanceProvider {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
    min_retry_delay: Duration,
}

impl YahooFinanceProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            min_retry_delay: DEFAULT_MIN_RETRY_DELAY,
        }
    }

    pub fn with_retry(mut self, max_retries: usize, min_retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.min_retry_delay = min_retry_delay;
        self
    }

    async fn request_chart(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<ChartResponse, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("range", period.as_str()), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::UnknownSymbol(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<ChartResponse>().await?)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    async fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries, MarketDataError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_retry_delay)
            .with_max_times(self.max_retries);

        let response = (|| async { self.request_chart(symbol, period).await })
            .retry(backoff)
            .when(MarketDataError::is_retryable)
            .notify(|err: &MarketDataError, after: Duration| {
                warn!(symbol, error = %err, retry_in_ms = after.as_millis() as u64, "Retrying chart request");
            })
            .await?;

        let series = chart_to_series(symbol, response)?;
        debug!(symbol, period = %period, points = series.len(), "Fetched price history");
        Ok(series)
    }
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn chart_to_series(symbol: &str, response: ChartResponse) -> Result<PriceSeries, MarketDataError> {
    if let Some(error) = response.chart.error {
        return Err(MarketDataError::Provider(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut points: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    for (index, &seconds) in result.timestamp.iter().enumerate() {
        let Some(close) = value_at(&quote.close, index) else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| MarketDataError::Decode(format!("timestamp out of range: {}", seconds)))?;

        // The live session is sometimes repeated at the end of the array.
        if let Some(last) = points.last() {
            if timestamp <= last.timestamp {
                warn!(symbol, %timestamp, "Dropping out-of-order quote");
                continue;
            }
        }

        let mut point = PricePoint::new(
            timestamp,
            value_at(&quote.open, index).unwrap_or(close),
            value_at(&quote.high, index).unwrap_or(close),
            value_at(&quote.low, index).unwrap_or(close),
            close,
        );
        if let Some(volume) = value_at(&quote.volume, index) {
            point = point.with_volume(volume);
        }
        points.push(point);
    }

    Ok(PriceSeries::new(points)?)
}
