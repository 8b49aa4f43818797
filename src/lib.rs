//! CoinVision: technical indicators and rule-based trading signals over daily
//! cryptocurrency price history.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
