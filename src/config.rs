//! Runtime configuration loaded from the environment (and `.env` when present).

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{
    DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW, DEFAULT_RSI_PERIOD,
};
use crate::indicators::validation::{
    validate_multiplier, validate_oscillator_level, validate_period,
};
use crate::indicators::volatility::{DEFAULT_BOLLINGER_K, DEFAULT_BOLLINGER_PERIOD};
use crate::services::market_data::Period;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Current deployment environment (`APP_ENV`), defaulting to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .map(|v| v.to_lowercase())
        .unwrap_or_else(|_| "sandbox".to_string())
}

/// Indicator windows and band width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            bollinger_period: DEFAULT_BOLLINGER_PERIOD,
            bollinger_k: DEFAULT_BOLLINGER_K,
            macd_fast: DEFAULT_MACD_FAST,
            macd_slow: DEFAULT_MACD_SLOW,
            macd_signal: DEFAULT_MACD_SIGNAL,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        validate_period("rsi_period", self.rsi_period)?;
        validate_period("bollinger_period", self.bollinger_period)?;
        validate_multiplier("bollinger_k", self.bollinger_k)?;
        validate_period("macd_fast", self.macd_fast)?;
        validate_period("macd_slow", self.macd_slow)?;
        validate_period("macd_signal", self.macd_signal)?;
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }
}

/// RSI levels for the oversold (buy) and overbought (sell) rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        validate_oscillator_level("rsi_oversold", self.rsi_oversold)?;
        validate_oscillator_level("rsi_overbought", self.rsi_overbought)?;
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(IndicatorError::InvalidParameter(format!(
                "rsi_oversold ({}) must be below rsi_overbought ({})",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub yahoo_base_url: String,
    pub default_period: Period,
    pub indicators: IndicatorConfig,
    pub thresholds: SignalThresholds,
    pub narrative: NarrativeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            port: DEFAULT_PORT,
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            default_period: Period::default(),
            indicators: IndicatorConfig::default(),
            thresholds: SignalThresholds::default(),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl Config {
    /// Build configuration from environment variables, falling back to the
    /// defaults for anything unset. Indicator and threshold settings are
    /// validated here so the engines never see an invalid configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let indicators = IndicatorConfig {
            rsi_period: env_or("RSI_PERIOD", defaults.indicators.rsi_period)?,
            bollinger_period: env_or("BOLLINGER_PERIOD", defaults.indicators.bollinger_period)?,
            bollinger_k: env_or("BOLLINGER_K", defaults.indicators.bollinger_k)?,
            macd_fast: env_or("MACD_FAST", defaults.indicators.macd_fast)?,
            macd_slow: env_or("MACD_SLOW", defaults.indicators.macd_slow)?,
            macd_signal: env_or("MACD_SIGNAL", defaults.indicators.macd_signal)?,
        };
        indicators.validate()?;

        let thresholds = SignalThresholds {
            rsi_oversold: env_or("RSI_OVERSOLD", defaults.thresholds.rsi_oversold)?,
            rsi_overbought: env_or("RSI_OVERBOUGHT", defaults.thresholds.rsi_overbought)?,
        };
        thresholds.validate()?;

        let narrative = NarrativeConfig {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.narrative.base_url),
            model: env::var("OPENAI_MODEL").unwrap_or(defaults.narrative.model),
        };

        Ok(Self {
            environment: get_environment(),
            port: env_or("PORT", defaults.port)?,
            yahoo_base_url: env::var("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            default_period: env_or("DEFAULT_PERIOD", defaults.default_period)?,
            indicators,
            thresholds,
            narrative,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}
