//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the trip
//! service for business logic.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};

use super::dto::{
    AddLogRequest, AssignRequest, CreateTripRequest, GenerateLogsRequest, GenerateLogsResponse,
    HealthResponse, TripListResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{DriverId, DutyInterval, Trip, TripId};
use crate::services::{DailyLog, NewLogRequest, NewTripRequest, RoutePlan};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the repository
/// is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.trips.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Trip CRUD
// =============================================================================

/// GET /v1/trips
///
/// List all trips, most recently created first.
pub async fn list_trips(State(state): State<AppState>) -> HandlerResult<TripListResponse> {
    let trips = state.trips.list_trips().await?;
    let total = trips.len();
    Ok(Json(TripListResponse { trips, total }))
}

/// GET /v1/trips/available
///
/// List trips open for assignment: unassigned and not yet started.
pub async fn list_available_trips(
    State(state): State<AppState>,
) -> HandlerResult<TripListResponse> {
    let trips = state.trips.list_available_trips().await?;
    let total = trips.len();
    Ok(Json(TripListResponse { trips, total }))
}

/// POST /v1/trips
///
/// Create a new trip. When coordinates are supplied the route is resolved up
/// front and the trip is stored with distance and duration estimates.
pub async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> Result<(axum::http::StatusCode, Json<Trip>), AppError> {
    let trip = state
        .trips
        .create_trip(NewTripRequest {
            current_location: request.current_location,
            pickup_location: request.pickup_location,
            dropoff_location: request.dropoff_location,
            pickup_coordinates: request.pickup_coordinates,
            dropoff_coordinates: request.dropoff_coordinates,
            current_cycle_used: request.current_cycle_used,
        })
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(trip)))
}

/// GET /v1/trips/{trip_id}
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> HandlerResult<Trip> {
    let trip = state.trips.get_trip(TripId::new(trip_id)).await?;
    Ok(Json(trip))
}

/// POST /v1/trips/{trip_id}/assign
///
/// Assign a driver to a trip.
pub async fn assign_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> HandlerResult<Trip> {
    let trip = state
        .trips
        .assign_trip(TripId::new(trip_id), DriverId::new(request.driver_id))
        .await?;
    Ok(Json(trip))
}

/// POST /v1/trips/{trip_id}/complete
///
/// Mark a trip completed. Idempotent.
pub async fn complete_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> HandlerResult<Trip> {
    let trip = state.trips.complete_trip(TripId::new(trip_id)).await?;
    Ok(Json(trip))
}

// =============================================================================
// Duty Logs
// =============================================================================

/// POST /v1/trips/{trip_id}/logs
///
/// Append a manual duty-log entry to an active trip.
pub async fn add_log(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Json(request): Json<AddLogRequest>,
) -> Result<(axum::http::StatusCode, Json<DutyInterval>), AppError> {
    let interval = state
        .trips
        .add_log(
            TripId::new(trip_id),
            NewLogRequest {
                status: request.status,
                start_time: request.start_time,
                end_time: request.end_time,
                location: request.location,
                remarks: request.remarks,
            },
        )
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(interval)))
}

/// POST /v1/trips/{trip_id}/generate-daily-logs
///
/// Generate the full duty schedule for a trip, replacing any previously
/// generated intervals and summaries.
pub async fn generate_daily_logs(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Json(request): Json<GenerateLogsRequest>,
) -> HandlerResult<GenerateLogsResponse> {
    let start = request.start_time.unwrap_or_else(Utc::now);
    let days = state
        .trips
        .generate_daily_logs(TripId::new(trip_id), start)
        .await?;
    Ok(Json(GenerateLogsResponse { trip_id, days }))
}

/// GET /v1/trips/{trip_id}/daily-logs
///
/// Fetch every day of a trip's duty log in date order.
pub async fn list_daily_logs(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> HandlerResult<Vec<DailyLog>> {
    let days = state.trips.daily_logs(TripId::new(trip_id)).await?;
    Ok(Json(days))
}

/// GET /v1/trips/{trip_id}/daily-logs/{date}
///
/// Fetch one day of a trip's duty log. Dates are ISO `YYYY-MM-DD`.
pub async fn get_daily_log(
    State(state): State<AppState>,
    Path((trip_id, date)): Path<(i64, String)>,
) -> HandlerResult<DailyLog> {
    let date: NaiveDate = date
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date)))?;
    let day = state.trips.daily_log(TripId::new(trip_id), date).await?;
    Ok(Json(day))
}

// =============================================================================
// Route
// =============================================================================

/// GET /v1/trips/{trip_id}/route
///
/// Resolve the trip's route and plan fuel stops along it.
pub async fn get_trip_route(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> HandlerResult<RoutePlan> {
    let plan = state.trips.trip_route(TripId::new(trip_id)).await?;
    Ok(Json(plan))
}
