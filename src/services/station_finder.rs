//! Nearby fuel-station lookup.
//!
//! External collaborator of the fuel-stop planner. Lookups are best-effort:
//! the planner swallows errors and treats them as empty results, so an outage
//! never blocks trip or log creation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::{Coordinate, Station};
use crate::models::geo::haversine_miles;

/// Maximum stations returned per stop.
pub const MAX_STATIONS: usize = 5;

const METERS_PER_MILE: f64 = 1609.344;

/// Station lookup failure. Callers degrade to an empty result list.
#[derive(Debug, thiserror::Error)]
#[error("Station lookup failed: {0}")]
pub struct StationLookupError(pub String);

/// Finds fuel stations near a coordinate, sorted by distance and capped at
/// [`MAX_STATIONS`].
#[async_trait]
pub trait StationFinder: Send + Sync {
    async fn find_nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_miles: f64,
    ) -> Result<Vec<Station>, StationLookupError>;
}

/// Station finder backed by the Overpass API (OpenStreetMap fuel amenities).
pub struct OverpassStationFinder {
    client: reqwest::Client,
    endpoint: String,
}

impl OverpassStationFinder {
    pub fn new() -> Self {
        Self::with_endpoint("https://overpass-api.de/api/interpreter")
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for OverpassStationFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: f64,
    lon: f64,
    #[serde(default)]
    tags: OverpassTags,
}

#[derive(Debug, Default, Deserialize)]
struct OverpassTags {
    name: Option<String>,
    brand: Option<String>,
}

#[async_trait]
impl StationFinder for OverpassStationFinder {
    async fn find_nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_miles: f64,
    ) -> Result<Vec<Station>, StationLookupError> {
        let radius_meters = (radius_miles * METERS_PER_MILE).round() as i64;
        let query = format!(
            "[out:json][timeout:10];node[\"amenity\"=\"fuel\"](around:{radius_meters},{lat},{lon});out;"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| StationLookupError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StationLookupError(format!(
                "Overpass returned HTTP {}",
                response.status()
            )));
        }

        let body: OverpassResponse = response
            .json()
            .await
            .map_err(|e| StationLookupError(e.to_string()))?;

        let center = Coordinate { lat, lon };
        let mut stations: Vec<Station> = body
            .elements
            .into_iter()
            .map(|element| Station {
                name: element
                    .tags
                    .name
                    .or_else(|| element.tags.brand.clone())
                    .unwrap_or_else(|| "Fuel station".to_string()),
                brand: element.tags.brand,
                lat: element.lat,
                lon: element.lon,
            })
            .collect();
        sort_by_distance(&mut stations, center);
        stations.truncate(MAX_STATIONS);
        Ok(stations)
    }
}

/// In-memory station finder for tests and local development.
pub struct StaticStationFinder {
    stations: Vec<Station>,
}

impl StaticStationFinder {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// A finder with no stations at all; every lookup comes back empty.
    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl StationFinder for StaticStationFinder {
    async fn find_nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_miles: f64,
    ) -> Result<Vec<Station>, StationLookupError> {
        let center = Coordinate { lat, lon };
        let mut stations: Vec<Station> = self
            .stations
            .iter()
            .filter(|station| {
                haversine_miles(
                    center,
                    Coordinate {
                        lat: station.lat,
                        lon: station.lon,
                    },
                ) <= radius_miles
            })
            .cloned()
            .collect();
        sort_by_distance(&mut stations, center);
        stations.truncate(MAX_STATIONS);
        Ok(stations)
    }
}

fn sort_by_distance(stations: &mut [Station], center: Coordinate) {
    stations.sort_by(|a, b| {
        let da = haversine_miles(center, Coordinate { lat: a.lat, lon: a.lon });
        let db = haversine_miles(center, Coordinate { lat: b.lat, lon: b.lon });
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(name: &str, lat: f64, lon: f64) -> Station {
        Station {
            name: name.to_string(),
            brand: None,
            lat,
            lon,
        }
    }

    #[tokio::test]
    async fn test_static_finder_filters_by_radius() {
        let finder = StaticStationFinder::new(vec![
            station("near", 40.0, -75.0),
            station("far", 45.0, -80.0),
        ]);
        let result = finder.find_nearby(40.0, -75.0, 25.0).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "near");
    }

    #[tokio::test]
    async fn test_static_finder_sorts_and_caps() {
        let stations: Vec<Station> = (0..8)
            .map(|i| station(&format!("s{i}"), 40.0 + i as f64 * 0.01, -75.0))
            .collect();
        let finder = StaticStationFinder::new(stations);

        let result = finder.find_nearby(40.0, -75.0, 100.0).await.unwrap();
        assert_eq!(result.len(), MAX_STATIONS);
        assert_eq!(result[0].name, "s0");
        assert_eq!(result[4].name, "s4");
    }

    #[tokio::test]
    async fn test_empty_finder_returns_empty_not_error() {
        let finder = StaticStationFinder::empty();
        let result = finder.find_nearby(40.0, -75.0, 25.0).await.unwrap();
        assert!(result.is_empty());
    }
}
