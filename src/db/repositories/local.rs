//! In-memory repository implementation.
//!
//! Backs unit tests and local development without a database server. Data
//! lives in process memory behind `parking_lot` locks and is lost on exit.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};

use super::super::repository::{
    ErrorContext, RepositoryError, RepositoryResult, TripRepository,
};
use crate::api::{DailySummary, DutyInterval, Trip, TripId};

/// In-memory trip repository.
///
/// Lock ordering: `trips` before `intervals` before `summaries`. No method
/// holds more than one lock at a time, so the ordering is currently moot but
/// documented for future changes.
pub struct LocalRepository {
    trips: RwLock<HashMap<TripId, Trip>>,
    intervals: RwLock<HashMap<TripId, Vec<DutyInterval>>>,
    summaries: RwLock<HashMap<TripId, BTreeMap<NaiveDate, DailySummary>>>,
    generation_locks: Mutex<HashMap<TripId, Arc<tokio::sync::Mutex<()>>>>,
    next_id: Mutex<i64>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            trips: RwLock::new(HashMap::new()),
            intervals: RwLock::new(HashMap::new()),
            summaries: RwLock::new(HashMap::new()),
            generation_locks: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
        }
    }

    fn allocate_id(&self) -> TripId {
        let mut next = self.next_id.lock();
        let id = TripId::new(*next);
        *next += 1;
        id
    }

    fn require_trip(&self, trip_id: TripId, operation: &str) -> RepositoryResult<()> {
        if self.trips.read().contains_key(&trip_id) {
            Ok(())
        } else {
            Err(RepositoryError::not_found(
                format!("Trip {} not found", trip_id),
                ErrorContext::new(operation)
                    .with_entity("trip")
                    .with_entity_id(trip_id),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripRepository for LocalRepository {
    async fn store_trip(&self, mut trip: Trip) -> RepositoryResult<Trip> {
        let id = match trip.id {
            Some(existing) => {
                return Err(RepositoryError::validation(
                    format!("Trip already has ID {}", existing),
                    ErrorContext::new("store_trip")
                        .with_entity("trip")
                        .with_entity_id(existing),
                ));
            }
            None => self.allocate_id(),
        };
        trip.id = Some(id);
        self.trips.write().insert(id, trip.clone());
        Ok(trip)
    }

    async fn get_trip(&self, trip_id: TripId) -> RepositoryResult<Trip> {
        self.trips.read().get(&trip_id).cloned().ok_or_else(|| {
            RepositoryError::not_found(
                format!("Trip {} not found", trip_id),
                ErrorContext::new("get_trip")
                    .with_entity("trip")
                    .with_entity_id(trip_id),
            )
        })
    }

    async fn list_trips(&self) -> RepositoryResult<Vec<Trip>> {
        let mut trips: Vec<Trip> = self.trips.read().values().cloned().collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(trips)
    }

    async fn update_trip(&self, trip: Trip) -> RepositoryResult<Trip> {
        let id = trip.id.ok_or_else(|| {
            RepositoryError::validation(
                "Cannot update a trip without an ID",
                ErrorContext::new("update_trip").with_entity("trip"),
            )
        })?;
        let mut trips = self.trips.write();
        if !trips.contains_key(&id) {
            return Err(RepositoryError::not_found(
                format!("Trip {} not found", id),
                ErrorContext::new("update_trip")
                    .with_entity("trip")
                    .with_entity_id(id),
            ));
        }
        trips.insert(id, trip.clone());
        Ok(trip)
    }

    async fn add_interval(&self, interval: DutyInterval) -> RepositoryResult<DutyInterval> {
        self.require_trip(interval.trip_id, "add_interval")?;
        let mut intervals = self.intervals.write();
        let list = intervals.entry(interval.trip_id).or_default();
        list.push(interval.clone());
        list.sort_by_key(|i| i.start_time);
        Ok(interval)
    }

    async fn replace_intervals(
        &self,
        trip_id: TripId,
        mut new_intervals: Vec<DutyInterval>,
    ) -> RepositoryResult<usize> {
        self.require_trip(trip_id, "replace_intervals")?;
        if let Some(stray) = new_intervals.iter().find(|i| i.trip_id != trip_id) {
            return Err(RepositoryError::validation(
                format!(
                    "Interval belongs to trip {}, expected {}",
                    stray.trip_id, trip_id
                ),
                ErrorContext::new("replace_intervals")
                    .with_entity("interval")
                    .with_entity_id(trip_id),
            ));
        }
        new_intervals.sort_by_key(|i| i.start_time);
        let count = new_intervals.len();
        self.intervals.write().insert(trip_id, new_intervals);
        Ok(count)
    }

    async fn intervals_for_trip(&self, trip_id: TripId) -> RepositoryResult<Vec<DutyInterval>> {
        self.require_trip(trip_id, "intervals_for_trip")?;
        Ok(self
            .intervals
            .read()
            .get(&trip_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn intervals_for_date(
        &self,
        trip_id: TripId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<DutyInterval>> {
        self.require_trip(trip_id, "intervals_for_date")?;
        Ok(self
            .intervals
            .read()
            .get(&trip_id)
            .map(|list| list.iter().filter(|i| i.date == date).cloned().collect())
            .unwrap_or_default())
    }

    async fn replace_daily_summaries(
        &self,
        trip_id: TripId,
        new_summaries: Vec<DailySummary>,
    ) -> RepositoryResult<usize> {
        self.require_trip(trip_id, "replace_daily_summaries")?;
        let mut by_date = BTreeMap::new();
        for summary in new_summaries {
            if summary.trip_id != trip_id {
                return Err(RepositoryError::validation(
                    format!(
                        "Summary belongs to trip {}, expected {}",
                        summary.trip_id, trip_id
                    ),
                    ErrorContext::new("replace_daily_summaries")
                        .with_entity("daily_summary")
                        .with_entity_id(trip_id),
                ));
            }
            if by_date.insert(summary.date, summary.clone()).is_some() {
                return Err(RepositoryError::validation(
                    format!("Duplicate summary for {}", summary.date),
                    ErrorContext::new("replace_daily_summaries")
                        .with_entity("daily_summary")
                        .with_entity_id(trip_id),
                ));
            }
        }
        let count = by_date.len();
        self.summaries.write().insert(trip_id, by_date);
        Ok(count)
    }

    async fn daily_summaries(&self, trip_id: TripId) -> RepositoryResult<Vec<DailySummary>> {
        self.require_trip(trip_id, "daily_summaries")?;
        Ok(self
            .summaries
            .read()
            .get(&trip_id)
            .map(|by_date| by_date.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn generation_lock(&self, trip_id: TripId) -> Arc<tokio::sync::Mutex<()>> {
        self.generation_locks
            .lock()
            .entry(trip_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
