//! Market data provider interface.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::error::IndicatorError;
use crate::models::indicators::PriceSeries;

/// Look-back window of daily history to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::FiveYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::FiveYears => "5y",
        }
    }

    /// Calendar days covered; crypto markets trade every day.
    pub fn days(&self) -> usize {
        match self {
            Period::OneMonth => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
            Period::FiveYears => 5 * 365,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown period: {} (expected one of 1mo, 3mo, 6mo, 1y, 5y)", s))
    }
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("market data provider error: {0}")]
    Provider(String),

    #[error("market data request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("market data provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("unexpected market data payload: {0}")]
    Decode(String),

    #[error("malformed price history: {0}")]
    Malformed(#[from] IndicatorError),
}

impl MarketDataError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketDataError::Transport(e) => !e.is_decode() && !e.is_builder(),
            MarketDataError::Status { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily price history for `symbol`, oldest first.
    async fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries, MarketDataError>;
}

/// Serves pre-loaded series; `fetch` returns the last `period.days()` points.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketDataProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: impl Into<String>, series: PriceSeries) -> Self {
        self.series.insert(symbol.into(), series);
        self
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryMarketDataProvider {
    async fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries, MarketDataError> {
        self.series
            .get(symbol)
            .map(|series| series.tail(period.days()))
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))
    }
}
