//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Trip CRUD
        .route("/trips", get(handlers::list_trips))
        .route("/trips", post(handlers::create_trip))
        .route("/trips/available", get(handlers::list_available_trips))
        .route("/trips/{trip_id}", get(handlers::get_trip))
        .route("/trips/{trip_id}/assign", post(handlers::assign_trip))
        .route("/trips/{trip_id}/complete", post(handlers::complete_trip))
        // Duty logs
        .route("/trips/{trip_id}/logs", post(handlers::add_log))
        .route(
            "/trips/{trip_id}/generate-daily-logs",
            post(handlers::generate_daily_logs),
        )
        .route("/trips/{trip_id}/daily-logs", get(handlers::list_daily_logs))
        .route(
            "/trips/{trip_id}/daily-logs/{date}",
            get(handlers::get_daily_log),
        )
        // Route and fuel planning
        .route("/trips/{trip_id}/route", get(handlers::get_trip_route));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::HosConfig;
    use crate::db::RepositoryFactory;
    use crate::services::{
        LogPublisher, StaticGeocoder, StaticStationFinder, SyntheticRouteProvider, TripService,
    };

    #[test]
    fn test_router_creation() {
        let config = Arc::new(HosConfig::default());
        let service = TripService::new(
            RepositoryFactory::create_local(),
            Arc::new(SyntheticRouteProvider::new(HosConfig::default())),
            Arc::new(StaticGeocoder::empty()),
            Arc::new(StaticStationFinder::empty()),
            Arc::new(LogPublisher),
            config,
        );
        let _router = create_router(AppState::new(Arc::new(service)));
        // If we got here, router was created successfully
    }
}
