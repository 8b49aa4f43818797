//! CoinVision API Server
//!
//! HTTP API serving indicator frames, signal tables and narrative analysis.
//! The service holds no state between requests and can be horizontally scaled.

use coinvision::config::Config;
use coinvision::core::http::{start_server, AppState};
use coinvision::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_logging();

    info!("Starting CoinVision API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    let state = AppState::from_config(&config)?;
    let port = config.port;

    let server = start_server(port, state);
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        result = server => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
            }
        }
    }

    info!("API server stopped");
    Ok(())
}
