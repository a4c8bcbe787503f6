//! Tests for LocalRepository.
//!
//! These tests cover CRUD behavior, wholesale replacement semantics, error
//! conditions, and concurrent access patterns for the in-memory repository.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use hos_rust::api::{DailySummary, DutyInterval, DutyStatus, Trip, TripId, TripStatus};
use hos_rust::db::repositories::LocalRepository;
use hos_rust::db::repository::TripRepository;

fn test_trip(pickup: &str, dropoff: &str) -> Trip {
    Trip::new(pickup, dropoff, Some(10.0)).unwrap()
}

fn interval(
    trip_id: TripId,
    status: DutyStatus,
    day: u32,
    start_hour: u32,
    end_hour: u32,
) -> DutyInterval {
    DutyInterval::new(
        trip_id,
        status,
        Utc.with_ymd_and_hms(2025, 4, day, start_hour, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 4, day, end_hour, 0, 0).unwrap(),
        "Highway",
        "test interval",
    )
}

fn summary(trip_id: TripId, day: u32) -> DailySummary {
    DailySummary {
        trip_id,
        date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
        driving_hours: 8.0,
        on_duty_hours: 1.0,
        off_duty_hours: 7.0,
        sleeper_berth_hours: 8.0,
    }
}

// =========================================================
// Trip CRUD
// =========================================================

#[tokio::test]
async fn test_store_assigns_sequential_ids() {
    let repo = LocalRepository::new();

    let first = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let second = repo.store_trip(test_trip("C", "D")).await.unwrap();

    assert!(first.id.is_some());
    assert!(second.id.is_some());
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_store_rejects_preassigned_id() {
    let repo = LocalRepository::new();
    let mut trip = test_trip("A", "B");
    trip.id = Some(TripId::new(99));

    assert!(repo.store_trip(trip).await.is_err());
}

#[tokio::test]
async fn test_get_roundtrip_and_not_found() {
    let repo = LocalRepository::new();
    let stored = repo.store_trip(test_trip("New York, NY", "Chicago, IL")).await.unwrap();

    let fetched = repo.get_trip(stored.id.unwrap()).await.unwrap();
    assert_eq!(fetched.pickup_location, "New York, NY");
    assert_eq!(fetched.status, TripStatus::NotStarted);

    let missing = repo.get_trip(TripId::new(404)).await;
    assert!(missing.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_update_requires_existing_trip() {
    let repo = LocalRepository::new();
    let mut stored = repo.store_trip(test_trip("A", "B")).await.unwrap();

    stored.status = TripStatus::InProgress;
    let updated = repo.update_trip(stored.clone()).await.unwrap();
    assert_eq!(updated.status, TripStatus::InProgress);

    let mut ghost = test_trip("X", "Y");
    ghost.id = Some(TripId::new(500));
    assert!(repo.update_trip(ghost).await.unwrap_err().is_not_found());

    let unstored = test_trip("X", "Y");
    assert!(repo.update_trip(unstored).await.is_err());
}

#[tokio::test]
async fn test_list_returns_all_trips() {
    let repo = LocalRepository::new();
    for i in 0..5 {
        repo.store_trip(test_trip(&format!("P{i}"), &format!("D{i}")))
            .await
            .unwrap();
    }

    let trips = repo.list_trips().await.unwrap();
    assert_eq!(trips.len(), 5);
    assert!(trips.iter().all(|t| t.id.is_some()));
}

// =========================================================
// Intervals
// =========================================================

#[tokio::test]
async fn test_add_interval_keeps_start_time_order() {
    let repo = LocalRepository::new();
    let trip = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let id = trip.id.unwrap();

    repo.add_interval(interval(id, DutyStatus::Driving, 26, 10, 12))
        .await
        .unwrap();
    repo.add_interval(interval(id, DutyStatus::Off, 26, 6, 8))
        .await
        .unwrap();

    let stored = repo.intervals_for_trip(id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].status, DutyStatus::Off);
    assert_eq!(stored[1].status, DutyStatus::Driving);
}

#[tokio::test]
async fn test_replace_intervals_is_wholesale() {
    let repo = LocalRepository::new();
    let trip = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let id = trip.id.unwrap();

    repo.add_interval(interval(id, DutyStatus::Driving, 26, 10, 12))
        .await
        .unwrap();

    let replacement = vec![
        interval(id, DutyStatus::Off, 27, 0, 6),
        interval(id, DutyStatus::Driving, 27, 6, 10),
    ];
    let count = repo.replace_intervals(id, replacement).await.unwrap();
    assert_eq!(count, 2);

    let stored = repo.intervals_for_trip(id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|i| i.date.day() == 27));
}

#[tokio::test]
async fn test_replace_intervals_rejects_foreign_trip_id() {
    let repo = LocalRepository::new();
    let trip = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let id = trip.id.unwrap();

    let stray = vec![interval(TripId::new(999), DutyStatus::Driving, 26, 10, 12)];
    assert!(repo.replace_intervals(id, stray).await.is_err());
}

#[tokio::test]
async fn test_intervals_for_date_filters_by_derived_date() {
    let repo = LocalRepository::new();
    let trip = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let id = trip.id.unwrap();

    repo.replace_intervals(
        id,
        vec![
            interval(id, DutyStatus::Driving, 26, 8, 12),
            interval(id, DutyStatus::Driving, 27, 8, 12),
        ],
    )
    .await
    .unwrap();

    let day = NaiveDate::from_ymd_opt(2025, 4, 26).unwrap();
    let on_day = repo.intervals_for_date(id, day).await.unwrap();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].date, day);

    let empty_day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    assert!(repo.intervals_for_date(id, empty_day).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_interval_operations_require_existing_trip() {
    let repo = LocalRepository::new();
    let ghost = TripId::new(77);

    assert!(repo
        .add_interval(interval(ghost, DutyStatus::Driving, 26, 8, 10))
        .await
        .unwrap_err()
        .is_not_found());
    assert!(repo.intervals_for_trip(ghost).await.unwrap_err().is_not_found());
    assert!(repo.replace_intervals(ghost, vec![]).await.unwrap_err().is_not_found());
}

// =========================================================
// Daily summaries
// =========================================================

#[tokio::test]
async fn test_summaries_replace_and_order_by_date() {
    let repo = LocalRepository::new();
    let trip = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let id = trip.id.unwrap();

    let count = repo
        .replace_daily_summaries(id, vec![summary(id, 28), summary(id, 26), summary(id, 27)])
        .await
        .unwrap();
    assert_eq!(count, 3);

    let stored = repo.daily_summaries(id).await.unwrap();
    let dates: Vec<u32> = stored.iter().map(|s| s.date.day()).collect();
    assert_eq!(dates, vec![26, 27, 28]);
}

#[tokio::test]
async fn test_summaries_reject_duplicate_dates() {
    let repo = LocalRepository::new();
    let trip = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let id = trip.id.unwrap();

    let result = repo
        .replace_daily_summaries(id, vec![summary(id, 26), summary(id, 26)])
        .await;
    assert!(result.is_err());
}

// =========================================================
// Concurrency
// =========================================================

#[tokio::test]
async fn test_concurrent_stores_get_unique_ids() {
    let repo = Arc::new(LocalRepository::new());

    let mut handles = vec![];
    for i in 0..20 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.store_trip(test_trip(&format!("P{i}"), "D")).await.unwrap()
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let trip = handle.await.unwrap();
        assert!(ids.insert(trip.id.unwrap()));
    }
    assert_eq!(ids.len(), 20);
    assert_eq!(repo.list_trips().await.unwrap().len(), 20);
}

#[tokio::test]
async fn test_generation_lock_is_shared_per_trip() {
    let repo = LocalRepository::new();
    let trip = repo.store_trip(test_trip("A", "B")).await.unwrap();
    let other = repo.store_trip(test_trip("C", "D")).await.unwrap();

    let lock_a = repo.generation_lock(trip.id.unwrap()).await;
    let lock_b = repo.generation_lock(trip.id.unwrap()).await;
    let lock_other = repo.generation_lock(other.id.unwrap()).await;

    assert!(Arc::ptr_eq(&lock_a, &lock_b));
    assert!(!Arc::ptr_eq(&lock_a, &lock_other));

    // Holding the lock blocks a second acquisition attempt.
    let guard = lock_a.lock().await;
    assert!(lock_b.try_lock().is_err());
    drop(guard);
    assert!(lock_b.try_lock().is_ok());
}

#[tokio::test]
async fn test_health_check() {
    let repo = LocalRepository::new();
    assert!(repo.health_check().await.unwrap());
}
