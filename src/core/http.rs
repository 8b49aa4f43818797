//! HTTP endpoint server using Axum

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::Config;
use crate::core::pipeline::Pipeline;
use crate::metrics::Metrics;
use crate::models::indicators::{PricePoint, PriceSeries};
use crate::models::signal::Strategy;
use crate::services::market_data::{MarketDataError, MarketDataProvider, Period};
use crate::services::narrative::{narrative_records, NarrativeAnalyst, OpenAiAnalyst};
use crate::services::yahoo::YahooFinanceProvider;

pub const SERVICE_NAME: &str = "coinvision";

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub pipeline: Arc<Pipeline>,
    pub provider: Arc<dyn MarketDataProvider>,
    pub analyst: Option<Arc<dyn NarrativeAnalyst>>,
    pub default_period: Period,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let pipeline = Pipeline::from_config(config)?;
        let provider = YahooFinanceProvider::new(config.yahoo_base_url.clone())?;
        let analyst = OpenAiAnalyst::from_config(&config.narrative)
            .map(|analyst| Arc::new(analyst) as Arc<dyn NarrativeAnalyst>);
        if analyst.is_none() {
            warn!("OPENAI_API_KEY not set - narrative endpoint will be unavailable");
        }

        Ok(Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: Arc::new(Metrics::new()?),
            start_time: Arc::new(Instant::now()),
            pipeline: Arc::new(pipeline),
            provider: Arc::new(provider),
            analyst,
            default_period: config.default_period,
        })
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

fn market_data_error(symbol: &str, err: MarketDataError) -> ApiError {
    match err {
        MarketDataError::UnknownSymbol(_) => api_error(StatusCode::NOT_FOUND, err),
        other => {
            error!(symbol, error = %other, "Market data fetch failed");
            api_error(StatusCode::BAD_GATEWAY, other)
        }
    }
}

fn resolve_period(requested: Option<&str>, default: Period) -> Result<Period, ApiError> {
    match requested {
        Some(raw) => Period::from_str(raw).map_err(|e| api_error(StatusCode::BAD_REQUEST, e)),
        None => Ok(default),
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": SERVICE_NAME
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzePointsRequest {
    points: Vec<PricePoint>,
}

#[derive(Debug, Deserialize)]
struct NarrativeRequest {
    prompt: Option<String>,
    period: Option<String>,
}

async fn fetch_series(
    state: &AppState,
    symbol: &str,
    period: Period,
) -> Result<PriceSeries, ApiError> {
    state
        .provider
        .fetch(symbol, period)
        .await
        .map_err(|e| market_data_error(symbol, e))
}

/// Full indicator and signal rows for a symbol
async fn analyze_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<AnalysisQuery>,
) -> Result<Json<Value>, ApiError> {
    let period = resolve_period(params.period.as_deref(), state.default_period)?;
    let series = fetch_series(&state, &symbol, period).await?;

    let frame = state.pipeline.run(&series);
    state.metrics.record_analysis("provider");
    info!(symbol = %symbol, period = %period, points = frame.len(), "Analyzed symbol");

    Ok(Json(json!({
        "symbol": symbol,
        "period": period,
        "latest": frame.latest_signals(),
        "rows": frame.rows(),
    })))
}

/// Strategy table for a symbol: defined rows only, newest first
async fn strategy_table(
    State(state): State<AppState>,
    Path((symbol, strategy)): Path<(String, String)>,
    Query(params): Query<AnalysisQuery>,
) -> Result<Json<Value>, ApiError> {
    let strategy =
        Strategy::from_str(&strategy).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let period = resolve_period(params.period.as_deref(), state.default_period)?;
    let series = fetch_series(&state, &symbol, period).await?;

    let frame = state.pipeline.run(&series);
    state.metrics.record_analysis("provider");

    Ok(Json(json!({
        "symbol": symbol,
        "period": period,
        "strategy": strategy,
        "rows": frame.strategy_table(strategy),
    })))
}

/// Analyze a caller-supplied price series
async fn analyze_points(
    State(state): State<AppState>,
    Json(request): Json<AnalyzePointsRequest>,
) -> Result<Json<Value>, ApiError> {
    let frame = state
        .pipeline
        .run_points(request.points)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;
    state.metrics.record_analysis("inline");

    Ok(Json(json!({
        "latest": frame.latest_signals(),
        "rows": frame.rows(),
    })))
}

/// Free-text analysis of a symbol's indicator frame
async fn narrative(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(request): Json<NarrativeRequest>,
) -> Result<Json<Value>, ApiError> {
    let analyst = state.analyst.clone().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "narrative analysis is not configured",
        )
    })?;

    let period = resolve_period(request.period.as_deref(), state.default_period)?;
    let series = fetch_series(&state, &symbol, period).await?;
    let frame = state.pipeline.indicators(&series);
    state.metrics.record_analysis("narrative");

    let prompt = request.prompt.unwrap_or_else(|| {
        format!(
            "Analyze the recent price action and indicators for {} over the last {}.",
            symbol, period
        )
    });
    let analysis = analyst
        .analyze(&prompt, &narrative_records(&frame))
        .await
        .map_err(|e| {
            error!(symbol = %symbol, error = %e, "Narrative analysis failed");
            api_error(StatusCode::BAD_GATEWAY, e)
        })?;

    Ok(Json(json!({
        "symbol": symbol,
        "period": period,
        "analysis": analysis,
    })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/analysis", post(analyze_points))
        .route("/api/analysis/{symbol}", get(analyze_symbol))
        .route(
            "/api/analysis/{symbol}/strategies/{strategy}",
            get(strategy_table),
        )
        .route("/api/analysis/{symbol}/narrative", post(narrative))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
