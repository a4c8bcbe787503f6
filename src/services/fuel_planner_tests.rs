//! Fuel-stop planner tests.

use crate::api::{Coordinate, Station};
use crate::services::fuel_planner::plan_fuel_stops;
use crate::services::station_finder::{StaticStationFinder, StationFinder, StationLookupError};
use async_trait::async_trait;

/// Waypoints marching north along a meridian; one degree of latitude is about
/// 69.1 miles, so `step_degrees` controls the segment length.
fn polyline(count: usize, step_degrees: f64) -> Vec<Coordinate> {
    (0..count)
        .map(|i| Coordinate {
            lat: 30.0 + i as f64 * step_degrees,
            lon: -100.0,
        })
        .collect()
}

struct FailingFinder;

#[async_trait]
impl StationFinder for FailingFinder {
    async fn find_nearby(
        &self,
        _lat: f64,
        _lon: f64,
        _radius_miles: f64,
    ) -> Result<Vec<Station>, StationLookupError> {
        Err(StationLookupError("service down".to_string()))
    }
}

#[tokio::test]
async fn test_stops_are_monotonic_and_interval_spaced() {
    // ~17.3-mile segments over ~500 miles, stop every 100 miles.
    let waypoints = polyline(30, 0.25);
    let finder = StaticStationFinder::empty();

    let stops = plan_fuel_stops(&waypoints, 100.0, &finder).await;
    assert!(stops.len() >= 4, "expected several stops, got {}", stops.len());

    let segment_miles = 0.25 * 69.1;
    let mut previous = 0.0;
    for stop in &stops {
        assert!(
            stop.distance_from_start > previous,
            "stops must be strictly increasing"
        );
        // Spacing stays within one waypoint of the requested interval.
        assert!(
            stop.distance_from_start - previous <= 100.0 + segment_miles,
            "stop at mile {:.1} too far from previous at {:.1}",
            stop.distance_from_start,
            previous
        );
        previous = stop.distance_from_start;
    }
}

#[tokio::test]
async fn test_short_route_has_no_stops() {
    let waypoints = polyline(5, 0.25); // ~69 miles total
    let finder = StaticStationFinder::empty();
    let stops = plan_fuel_stops(&waypoints, 1000.0, &finder).await;
    assert!(stops.is_empty());
}

#[tokio::test]
async fn test_empty_and_degenerate_input() {
    let finder = StaticStationFinder::empty();
    assert!(plan_fuel_stops(&[], 100.0, &finder).await.is_empty());

    let single = polyline(1, 0.25);
    assert!(plan_fuel_stops(&single, 100.0, &finder).await.is_empty());

    let waypoints = polyline(30, 0.25);
    assert!(plan_fuel_stops(&waypoints, 0.0, &finder).await.is_empty());
}

#[tokio::test]
async fn test_duplicate_waypoints_do_not_skew_thresholds() {
    let clean = polyline(30, 0.25);
    let mut with_duplicates = Vec::new();
    for point in &clean {
        with_duplicates.push(*point);
        with_duplicates.push(*point); // repeat every waypoint
    }
    let finder = StaticStationFinder::empty();

    let from_clean = plan_fuel_stops(&clean, 100.0, &finder).await;
    let from_duplicates = plan_fuel_stops(&with_duplicates, 100.0, &finder).await;

    assert_eq!(from_clean.len(), from_duplicates.len());
    for (a, b) in from_clean.iter().zip(&from_duplicates) {
        assert!((a.distance_from_start - b.distance_from_start).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_lookup_failure_yields_empty_stations_not_error() {
    let waypoints = polyline(30, 0.25);
    let stops = plan_fuel_stops(&waypoints, 100.0, &FailingFinder).await;
    assert!(!stops.is_empty());
    assert!(stops.iter().all(|s| s.nearby_stations.is_empty()));
}

#[tokio::test]
async fn test_primary_search_annotates_stations() {
    let waypoints = polyline(30, 0.25);
    // One station sitting directly on the route.
    let finder = StaticStationFinder::new(vec![Station {
        name: "Route Fuel".to_string(),
        brand: Some("TA".to_string()),
        lat: waypoints[6].lat,
        lon: waypoints[6].lon,
    }]);

    let stops = plan_fuel_stops(&waypoints, 100.0, &finder).await;
    let first = &stops[0];
    assert_eq!(first.nearby_stations.len(), 1);
    assert_eq!(first.nearby_stations[0].name, "Route Fuel");
}

#[tokio::test]
async fn test_fallback_scan_finds_station_near_neighbor_waypoint() {
    let waypoints = polyline(30, 0.25);
    // The first stop lands near waypoint 6 (~104 mi). Place the only station
    // ~35 route-miles back, outside the 25-mile primary radius but within
    // 10 miles of waypoint 4 and within the 50-mile fallback span.
    let finder = StaticStationFinder::new(vec![Station {
        name: "Back Road Fuel".to_string(),
        brand: None,
        lat: waypoints[4].lat,
        lon: waypoints[4].lon + 0.08, // ~4.8 miles east
    }]);

    let stops = plan_fuel_stops(&waypoints, 100.0, &finder).await;
    let first = &stops[0];
    assert_eq!(first.nearby_stations.len(), 1);
    assert_eq!(first.nearby_stations[0].name, "Back Road Fuel");
}
