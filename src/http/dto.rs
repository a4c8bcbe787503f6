//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Domain types that already derive Serialize/Deserialize are re-exported
//! rather than duplicated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export domain types that serialize as-is.
pub use crate::api::{
    Coordinate, DailySummary, DutyInterval, DutyStatus, FuelStop, RouteSummary, Station, Trip,
    TripStatus,
};
pub use crate::services::{DailyLog, RoutePlan};

/// Request body for creating a new trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTripRequest {
    /// Where the truck is right now; defaults to the pickup location.
    #[serde(default)]
    pub current_location: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default)]
    pub pickup_coordinates: Option<Coordinate>,
    #[serde(default)]
    pub dropoff_coordinates: Option<Coordinate>,
    /// Hours already used in the rolling 70-hour cycle (0-70).
    #[serde(default)]
    pub current_cycle_used: Option<f64>,
}

/// Request body for appending a manual duty-log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLogRequest {
    pub status: DutyStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub remarks: String,
}

/// Request body for generating the duty schedule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerateLogsRequest {
    /// When the driver starts the first day; defaults to now.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

/// Request body for assigning a driver to a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    pub driver_id: i64,
}

/// Trip list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripListResponse {
    pub trips: Vec<Trip>,
    pub total: usize,
}

/// Response for a schedule generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateLogsResponse {
    pub trip_id: i64,
    pub days: Vec<DailyLog>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Repository connection status
    pub database: String,
}
