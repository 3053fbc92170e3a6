//! Decision HTTP Server Binary
//!
//! This is the main entry point for the decision REST API server.
//! It loads the engine configuration, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with built-in defaults (or ./decision.toml when present)
//! cargo run --bin decision-server
//!
//! # Run with an explicit configuration file
//! DECISION_CONFIG=/etc/decision.toml cargo run --bin decision-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: config `server.host`, 0.0.0.0)
//! - `PORT`: Server port (default: config `server.port`, 8080)
//! - `DECISION_CONFIG`: Path to a TOML configuration file
//! - `RUST_LOG`: Log level (default: info)
//!
//! The server starts without predictors; hosts that embed trained models build
//! their own [`ModelRegistry`] and call [`create_router`].

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use retail_decision::config::EngineConfig;
use retail_decision::http::{create_router, AppState};
use retail_decision::predictors::ModelRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting decision HTTP server");

    let config = load_config()?;
    let registry = ModelRegistry::new();
    let status = registry.status();
    if !status.demand_loaded || !status.risk_loaded {
        warn!(
            "Serving without predictors (demand: {}, risk: {}); responses carry MODEL_NOT_LOADED diagnostics",
            status.demand_loaded, status.risk_loaded
        );
    }

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| config.server.host.clone());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    // Create router with all endpoints
    let app = create_router(AppState::new(registry, config));

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `DECISION_CONFIG` if set, else `decision.toml` in the usual places, else defaults.
fn load_config() -> anyhow::Result<EngineConfig> {
    let path = env::var("DECISION_CONFIG")
        .ok()
        .map(Into::into)
        .or_else(EngineConfig::default_location);

    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Ok(EngineConfig::from_file(&path)?)
        }
        None => {
            info!("No configuration file found; using defaults");
            Ok(EngineConfig::default())
        }
    }
}
