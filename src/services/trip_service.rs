//! Trip orchestration service.
//!
//! Ties the pure scheduler to the repository and the external collaborators:
//! resolves routes (with straight-line fallback), generates and persists duty
//! schedules under a per-trip lock, aggregates daily summaries, and publishes
//! notifications after every successful mutation.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::api::{
    Coordinate, DailySummary, DutyInterval, DutyStatus, FuelStop, RouteSummary, Trip, TripId,
    TripStatus,
};
use crate::config::HosConfig;
use crate::db::{RepositoryError, TripRepository};
use crate::scheduler::{generate_schedule, GenerateError};
use crate::services::daily_summary::{summarize_day_lenient, SummaryError};
use crate::services::fuel_planner::plan_fuel_stops;
use crate::services::notifier::{trip_channel, EventType, NotificationPublisher, ALL_TRIPS_CHANNEL};
use crate::services::route_provider::{
    straight_line_estimate, Geocoder, RouteError, RouteProvider,
};
use crate::services::station_finder::StationFinder;

/// Errors surfaced by trip operations.
#[derive(Debug, thiserror::Error)]
pub enum TripServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error("{0}")]
    Internal(String),
}

impl From<RepositoryError> for TripServiceError {
    fn from(err: RepositoryError) -> Self {
        if err.is_not_found() {
            TripServiceError::NotFound(err.to_string())
        } else {
            TripServiceError::Repository(err)
        }
    }
}

/// Input for creating a trip.
#[derive(Debug, Clone)]
pub struct NewTripRequest {
    pub current_location: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub pickup_coordinates: Option<Coordinate>,
    pub dropoff_coordinates: Option<Coordinate>,
    pub current_cycle_used: Option<f64>,
}

/// Input for appending a manual duty-log entry.
#[derive(Debug, Clone)]
pub struct NewLogRequest {
    pub status: DutyStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub remarks: String,
}

/// One day of a trip's duty log: the intervals plus their totals.
#[derive(Debug, Clone, Serialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub intervals: Vec<DutyInterval>,
    pub summary: DailySummary,
}

/// A resolved route plus the planned fuel stops along it.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub route: RouteSummary,
    pub fuel_stops: Vec<FuelStop>,
}

/// Orchestration facade over the repository and external collaborators.
pub struct TripService {
    repository: Arc<dyn TripRepository>,
    route_provider: Arc<dyn RouteProvider>,
    geocoder: Arc<dyn Geocoder>,
    station_finder: Arc<dyn StationFinder>,
    publisher: Arc<dyn NotificationPublisher>,
    config: Arc<HosConfig>,
}

impl TripService {
    pub fn new(
        repository: Arc<dyn TripRepository>,
        route_provider: Arc<dyn RouteProvider>,
        geocoder: Arc<dyn Geocoder>,
        station_finder: Arc<dyn StationFinder>,
        publisher: Arc<dyn NotificationPublisher>,
        config: Arc<HosConfig>,
    ) -> Self {
        Self {
            repository,
            route_provider,
            geocoder,
            station_finder,
            publisher,
            config,
        }
    }

    /// Create and store a new trip.
    ///
    /// Endpoints given as plain addresses are geocoded; once both endpoints
    /// carry coordinates the route provider is consulted so the trip is
    /// stored with its distance and duration estimates. A geocoder or
    /// provider outage degrades the estimates rather than failing creation.
    pub async fn create_trip(&self, request: NewTripRequest) -> Result<Trip, TripServiceError> {
        let mut trip = Trip::new(
            request.pickup_location,
            request.dropoff_location,
            request.current_cycle_used,
        )
        .map_err(TripServiceError::Validation)?;
        if let Some(location) = request.current_location {
            trip.current_location = Some(location);
        }
        trip.pickup_coordinates = request.pickup_coordinates;
        trip.dropoff_coordinates = request.dropoff_coordinates;
        if trip.pickup_coordinates.is_none() {
            trip.pickup_coordinates = self.lookup_coordinates(&trip.pickup_location).await;
        }
        if trip.dropoff_coordinates.is_none() {
            trip.dropoff_coordinates = self.lookup_coordinates(&trip.dropoff_location).await;
        }

        if let (Some(origin), Some(destination)) =
            (trip.pickup_coordinates, trip.dropoff_coordinates)
        {
            let route = self.fetch_route_or_estimate(origin, destination).await;
            trip.total_distance = Some(route.total_distance_miles);
            trip.estimated_driving_time = Some(route.total_duration_hours);
        }

        let trip = self.repository.store_trip(trip).await?;
        self.publish_trip_event(&trip, EventType::TripCreated);
        Ok(trip)
    }

    /// Check that the backing repository is reachable.
    pub async fn health_check(&self) -> Result<bool, TripServiceError> {
        Ok(self.repository.health_check().await?)
    }

    pub async fn get_trip(&self, trip_id: TripId) -> Result<Trip, TripServiceError> {
        Ok(self.repository.get_trip(trip_id).await?)
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, TripServiceError> {
        Ok(self.repository.list_trips().await?)
    }

    /// Trips open for assignment: unassigned and not yet started.
    pub async fn list_available_trips(&self) -> Result<Vec<Trip>, TripServiceError> {
        let trips = self.repository.list_trips().await?;
        Ok(trips
            .into_iter()
            .filter(|t| t.driver.is_none() && t.status == TripStatus::NotStarted)
            .collect())
    }

    /// Assign a driver to a trip. Completed trips cannot be reassigned.
    pub async fn assign_trip(
        &self,
        trip_id: TripId,
        driver: crate::api::DriverId,
    ) -> Result<Trip, TripServiceError> {
        let mut trip = self.repository.get_trip(trip_id).await?;
        if trip.status == TripStatus::Completed {
            return Err(TripServiceError::Validation(format!(
                "Trip {} is completed and cannot be reassigned",
                trip_id
            )));
        }
        trip.driver = Some(driver);
        let trip = self.repository.update_trip(trip).await?;
        self.publish_trip_event(&trip, EventType::TripUpdated);
        Ok(trip)
    }

    /// Mark a trip completed. Idempotent: completing a completed trip is a
    /// no-op, not an error.
    pub async fn complete_trip(&self, trip_id: TripId) -> Result<Trip, TripServiceError> {
        let mut trip = self.repository.get_trip(trip_id).await?;
        if trip.status == TripStatus::Completed {
            return Ok(trip);
        }
        trip.status = TripStatus::Completed;
        trip.current_location = Some(trip.dropoff_location.clone());
        let trip = self.repository.update_trip(trip).await?;
        self.publish_trip_event(&trip, EventType::TripUpdated);
        Ok(trip)
    }

    /// Append a manual duty-log entry to an active trip.
    ///
    /// The first log entry moves a `NotStarted` trip to `InProgress`; the
    /// entry's location becomes the trip's current location.
    pub async fn add_log(
        &self,
        trip_id: TripId,
        request: NewLogRequest,
    ) -> Result<DutyInterval, TripServiceError> {
        if request.end_time <= request.start_time {
            return Err(TripServiceError::Validation(
                "Log end time must be after its start time".to_string(),
            ));
        }

        let mut trip = self.repository.get_trip(trip_id).await?;
        if trip.status == TripStatus::Completed {
            return Err(TripServiceError::Validation(format!(
                "Trip {} is completed and no longer accepts log entries",
                trip_id
            )));
        }

        let interval = DutyInterval::new(
            trip_id,
            request.status,
            request.start_time,
            request.end_time,
            request.location,
            request.remarks,
        );
        let interval = self.repository.add_interval(interval).await?;

        if trip.status == TripStatus::NotStarted {
            trip.status = TripStatus::InProgress;
        }
        trip.current_location = Some(interval.location.clone());
        let trip = self.repository.update_trip(trip).await?;

        self.publisher.publish(
            &trip_channel(trip_id),
            EventType::LogCreated,
            serde_json::json!({ "trip_id": trip_id, "log": interval }),
        );
        self.publish_trip_event(&trip, EventType::TripUpdated);
        Ok(interval)
    }

    /// Generate the full duty schedule for a trip and persist it.
    ///
    /// Replaces any previously generated intervals and summaries wholesale.
    /// Concurrent generation requests for the same trip are serialized by a
    /// per-trip lock; the later caller regenerates over the earlier result.
    pub async fn generate_daily_logs(
        &self,
        trip_id: TripId,
        start: DateTime<Utc>,
    ) -> Result<Vec<DailyLog>, TripServiceError> {
        let mut trip = self.repository.get_trip(trip_id).await?;
        if trip.status == TripStatus::Completed {
            return Err(TripServiceError::Validation(format!(
                "Trip {} is completed; its logs cannot be regenerated",
                trip_id
            )));
        }
        let route = self.resolve_route(&trip).await?;

        let lock = self.repository.generation_lock(trip_id).await;
        let _guard = lock.lock().await;

        // Generation is pure CPU work; keep it off the async executor.
        let intervals = {
            let trip = trip.clone();
            let route = route.clone();
            let config = Arc::clone(&self.config);
            tokio::task::spawn_blocking(move || {
                generate_schedule(trip_id, &trip, &route, start, &config)
            })
                .await
                .map_err(|e| TripServiceError::Internal(format!("generation task failed: {e}")))??
        };
        let dates: BTreeSet<NaiveDate> = intervals.iter().map(|i| i.date).collect();
        let mut summaries = Vec::with_capacity(dates.len());
        for date in &dates {
            match summarize_day_lenient(trip_id, *date, &intervals) {
                Ok(summary) => summaries.push(summary),
                // Unreachable for dates taken from the interval set itself.
                Err(SummaryError::NoIntervals { date }) => {
                    log::warn!("no intervals for generated date {date}");
                }
                Err(err) => {
                    return Err(TripServiceError::Validation(err.to_string()));
                }
            }
        }

        self.repository
            .replace_intervals(trip_id, intervals.clone())
            .await?;
        self.repository
            .replace_daily_summaries(trip_id, summaries.clone())
            .await?;

        if trip.status == TripStatus::NotStarted {
            trip.status = TripStatus::InProgress;
        }
        trip.total_distance = Some(route.total_distance_miles);
        trip.estimated_driving_time = Some(route.total_duration_hours);
        let trip = self.repository.update_trip(trip).await?;

        self.publisher.publish(
            &trip_channel(trip_id),
            EventType::LogCreated,
            serde_json::json!({ "trip_id": trip_id, "days": summaries.len() }),
        );
        self.publish_trip_event(&trip, EventType::TripUpdated);

        Ok(assemble_daily_logs(intervals, summaries))
    }

    /// Fetch one day of a trip's duty log.
    pub async fn daily_log(
        &self,
        trip_id: TripId,
        date: NaiveDate,
    ) -> Result<DailyLog, TripServiceError> {
        let intervals = self.repository.intervals_for_date(trip_id, date).await?;
        if intervals.is_empty() {
            return Err(TripServiceError::NotFound(format!(
                "Trip {} has no duty log for {}",
                trip_id, date
            )));
        }
        let summary = summarize_day_lenient(trip_id, date, &intervals)
            .map_err(|e| TripServiceError::Validation(e.to_string()))?;
        Ok(DailyLog {
            date,
            intervals,
            summary,
        })
    }

    /// Fetch every day of a trip's duty log in date order.
    pub async fn daily_logs(&self, trip_id: TripId) -> Result<Vec<DailyLog>, TripServiceError> {
        let intervals = self.repository.intervals_for_trip(trip_id).await?;
        let summaries = self.repository.daily_summaries(trip_id).await?;
        Ok(assemble_daily_logs(intervals, summaries))
    }

    /// Resolve a trip's route and plan the fuel stops along it.
    pub async fn trip_route(&self, trip_id: TripId) -> Result<RoutePlan, TripServiceError> {
        let trip = self.repository.get_trip(trip_id).await?;
        let route = self.resolve_route(&trip).await?;
        let fuel_stops = plan_fuel_stops(
            &route.waypoints,
            self.config.fuel_stop_interval_miles,
            self.station_finder.as_ref(),
        )
        .await;
        Ok(RoutePlan { route, fuel_stops })
    }

    /// Route for the trip, in order of preference: live provider lookup
    /// (geocoding plain addresses first), straight-line estimate, stored
    /// totals from creation time.
    async fn resolve_route(&self, trip: &Trip) -> Result<RouteSummary, TripServiceError> {
        let mut pickup = trip.pickup_coordinates;
        let mut dropoff = trip.dropoff_coordinates;
        if pickup.is_none() {
            pickup = self.lookup_coordinates(&trip.pickup_location).await;
        }
        if dropoff.is_none() {
            dropoff = self.lookup_coordinates(&trip.dropoff_location).await;
        }
        if let (Some(origin), Some(destination)) = (pickup, dropoff) {
            return Ok(self.fetch_route_or_estimate(origin, destination).await);
        }

        if let (Some(distance), Some(duration)) = (trip.total_distance, trip.estimated_driving_time)
        {
            return Ok(RouteSummary {
                total_distance_miles: distance,
                total_duration_hours: duration,
                waypoints: Vec::new(),
            });
        }

        Err(TripServiceError::Validation(
            "Trip has neither coordinates nor stored route estimates".to_string(),
        ))
    }

    /// Geocode an address, treating failure as "no coordinates" so callers
    /// can fall back to stored totals.
    async fn lookup_coordinates(&self, address: &str) -> Option<Coordinate> {
        match self.geocoder.geocode(address).await {
            Ok(coordinate) => Some(coordinate),
            Err(err) => {
                log::warn!("could not geocode '{address}' ({err})");
                None
            }
        }
    }

    async fn fetch_route_or_estimate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> RouteSummary {
        match self.route_provider.get_route(origin, destination).await {
            Ok(route) => route,
            Err(err) => {
                log::warn!("route provider failed ({err}); using straight-line estimate");
                straight_line_estimate(origin, destination, &self.config)
            }
        }
    }

    fn publish_trip_event(&self, trip: &Trip, event: EventType) {
        let payload = serde_json::json!({ "trip": trip });
        if let Some(id) = trip.id {
            self.publisher
                .publish(&trip_channel(id), event, payload.clone());
        }
        self.publisher.publish(ALL_TRIPS_CHANNEL, event, payload);
    }
}

/// Group intervals by date and pair them with their summaries.
fn assemble_daily_logs(intervals: Vec<DutyInterval>, summaries: Vec<DailySummary>) -> Vec<DailyLog> {
    summaries
        .into_iter()
        .map(|summary| DailyLog {
            date: summary.date,
            intervals: intervals
                .iter()
                .filter(|i| i.date == summary.date)
                .cloned()
                .collect(),
            summary,
        })
        .collect()
}
