//! Fuel-stop planning along a route.
//!
//! Walks the waypoint polyline accumulating great-circle distance and records
//! a stop each time the cumulative distance crosses the next multiple of the
//! configured interval. Each stop is annotated with nearby stations; when the
//! primary search comes back empty, neighboring waypoints within a bounded
//! span of route distance are scanned with a tighter radius. Station lookup
//! never fails the plan: errors degrade to an empty station list.

use crate::api::{Coordinate, FuelStop};
use crate::models::geo::{collapse_duplicate_waypoints, haversine_miles};
use crate::services::station_finder::{StationFinder, MAX_STATIONS};

/// Radius of the primary station search around a stop.
const PRIMARY_RADIUS_MILES: f64 = 25.0;
/// Neighboring waypoints within this much route distance are scanned when the
/// primary search is empty.
const FALLBACK_SPAN_MILES: f64 = 50.0;
/// Tighter per-point radius used during the fallback scan.
const FALLBACK_RADIUS_MILES: f64 = 10.0;

/// Plan refueling stops every `interval_miles` along the waypoint polyline.
///
/// Stops are strictly ordered by increasing distance from the start. An empty
/// waypoint list, or one shorter than the interval, yields no stops.
pub async fn plan_fuel_stops(
    waypoints: &[Coordinate],
    interval_miles: f64,
    finder: &dyn StationFinder,
) -> Vec<FuelStop> {
    let points = collapse_duplicate_waypoints(waypoints);
    if points.len() < 2 || interval_miles <= 0.0 {
        return Vec::new();
    }

    // Cumulative route distance at each waypoint.
    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0_f64);
    for pair in points.windows(2) {
        let last = *cumulative.last().unwrap_or(&0.0);
        cumulative.push(last + haversine_miles(pair[0], pair[1]));
    }

    let mut stops = Vec::new();
    let mut next_threshold = interval_miles;
    let mut last_stop_index: Option<usize> = None;

    for i in 1..points.len() {
        while cumulative[i] >= next_threshold {
            // Pick whichever endpoint of the crossing segment lies closer to
            // the threshold, without reusing a waypoint for two stops.
            let before = (next_threshold - cumulative[i - 1]).abs();
            let after = (cumulative[i] - next_threshold).abs();
            let mut index = if before < after { i - 1 } else { i };
            if last_stop_index == Some(index) {
                index = i;
            }

            if last_stop_index != Some(index) {
                let stations =
                    stations_for_stop(&points, &cumulative, index, finder).await;
                stops.push(FuelStop {
                    location: points[index],
                    distance_from_start: cumulative[index],
                    nearby_stations: stations,
                });
                last_stop_index = Some(index);
            }
            next_threshold += interval_miles;
        }
    }

    stops
}

/// Station search for one stop: primary radius first, then a backward/forward
/// scan over neighboring waypoints. The first non-empty result wins.
async fn stations_for_stop(
    points: &[Coordinate],
    cumulative: &[f64],
    index: usize,
    finder: &dyn StationFinder,
) -> Vec<crate::api::Station> {
    let stop = points[index];
    match finder
        .find_nearby(stop.lat, stop.lon, PRIMARY_RADIUS_MILES)
        .await
    {
        Ok(stations) if !stations.is_empty() => {
            return cap(stations);
        }
        Ok(_) => {}
        Err(err) => {
            log::warn!(
                "station lookup failed at mile {:.1}: {}",
                cumulative[index],
                err
            );
        }
    }

    // Alternate backward and forward from the stop, nearest neighbors first.
    for offset in 1..points.len() {
        let mut candidates = Vec::new();
        if index >= offset {
            candidates.push(index - offset);
        }
        if index + offset < points.len() {
            candidates.push(index + offset);
        }
        if candidates.is_empty() {
            break;
        }

        let mut any_in_span = false;
        for candidate in candidates {
            if (cumulative[candidate] - cumulative[index]).abs() > FALLBACK_SPAN_MILES {
                continue;
            }
            any_in_span = true;
            let point = points[candidate];
            match finder
                .find_nearby(point.lat, point.lon, FALLBACK_RADIUS_MILES)
                .await
            {
                Ok(stations) if !stations.is_empty() => return cap(stations),
                Ok(_) => {}
                Err(err) => {
                    log::warn!(
                        "fallback station lookup failed at mile {:.1}: {}",
                        cumulative[candidate],
                        err
                    );
                }
            }
        }
        if !any_in_span {
            break;
        }
    }

    Vec::new()
}

fn cap(mut stations: Vec<crate::api::Station>) -> Vec<crate::api::Station> {
    stations.truncate(MAX_STATIONS);
    stations
}
