//! HOS HTTP Server Binary
//!
//! This is the main entry point for the HOS trip-planner REST API server.
//! It initializes the repository, wires the trip service with its external
//! collaborators, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with local (in-memory) repository (default)
//! cargo run --bin hos-server --features "local-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `ORS_API_KEY`: OpenRouteService API key; without it route lookups fail
//!   and trips fall back to straight-line estimates
//! - `HOS_CONFIG`: Path to a TOML file overriding the scheduling parameters
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use hos_rust::config::HosConfig;
use hos_rust::db;
use hos_rust::http::{create_router, AppState};
use hos_rust::services::{
    LogPublisher, NominatimGeocoder, OpenRouteService, OverpassStationFinder, TripService,
};

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

    info!("Starting HOS HTTP Server");

    // Scheduling parameters: file override or regulatory defaults.
    let config = match env::var("HOS_CONFIG") {
        Ok(path) => {
            let config = HosConfig::from_toml_file(&path)?;
            info!("Loaded scheduling config from {}", path);
            config
        }
        Err(_) => HosConfig::default(),
    };
    let config = Arc::new(config);

    // Initialize global repository once and reuse it across the app
    db::init_repository().map_err(|e| anyhow::anyhow!(e))?;
    let repository = Arc::clone(db::get_repository()?);
    info!("Repository initialized successfully");

    let api_key = env::var("ORS_API_KEY").unwrap_or_else(|_| {
        warn!("ORS_API_KEY not set; route lookups will fall back to straight-line estimates");
        String::new()
    });
    let route_provider = Arc::new(OpenRouteService::new(api_key, &config));
    let geocoder = Arc::new(NominatimGeocoder::new());
    let station_finder = Arc::new(OverpassStationFinder::new());

    let trips = Arc::new(TripService::new(
        repository,
        route_provider,
        geocoder,
        station_finder,
        Arc::new(LogPublisher),
        config,
    ));

    // Create router with all endpoints
    let app = create_router(AppState::new(trips));

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("API documentation: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
