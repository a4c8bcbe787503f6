//! Repository trait for trip and duty-log storage.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::api::{DailySummary, DutyInterval, Trip, TripId};

/// Repository trait for trip storage operations.
///
/// Covers trips, their duty intervals, and the per-date summaries derived
/// from them. Schedule generation replaces intervals and summaries
/// wholesale; there is no partial regeneration.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Store a new trip and return it with its assigned ID.
    async fn store_trip(&self, trip: Trip) -> RepositoryResult<Trip>;

    /// Fetch a trip by ID.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no trip has this ID
    async fn get_trip(&self, trip_id: TripId) -> RepositoryResult<Trip>;

    /// List all trips, most recently created first.
    async fn list_trips(&self) -> RepositoryResult<Vec<Trip>>;

    /// Update an existing trip in place.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the trip does not exist
    async fn update_trip(&self, trip: Trip) -> RepositoryResult<Trip>;

    /// Append a single duty interval to a trip.
    async fn add_interval(&self, interval: DutyInterval) -> RepositoryResult<DutyInterval>;

    /// Replace every duty interval of a trip with a freshly generated set.
    async fn replace_intervals(
        &self,
        trip_id: TripId,
        intervals: Vec<DutyInterval>,
    ) -> RepositoryResult<usize>;

    /// Fetch all duty intervals for a trip, ordered by start time.
    async fn intervals_for_trip(&self, trip_id: TripId) -> RepositoryResult<Vec<DutyInterval>>;

    /// Fetch the duty intervals of a trip that fall on a given date.
    async fn intervals_for_date(
        &self,
        trip_id: TripId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<DutyInterval>>;

    /// Replace the per-date summaries of a trip. At most one summary per date.
    async fn replace_daily_summaries(
        &self,
        trip_id: TripId,
        summaries: Vec<DailySummary>,
    ) -> RepositoryResult<usize>;

    /// Fetch the per-date summaries of a trip in date order.
    async fn daily_summaries(&self, trip_id: TripId) -> RepositoryResult<Vec<DailySummary>>;

    /// Per-trip mutex serializing schedule generation. Two concurrent
    /// generation requests for the same trip must not interleave their
    /// replace operations.
    async fn generation_lock(&self, trip_id: TripId) -> Arc<Mutex<()>>;

    /// Check backend availability.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
