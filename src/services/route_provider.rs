//! Route providers.
//!
//! A [`RouteProvider`] turns an origin/destination pair into a
//! [`RouteSummary`]: total miles, total duty hours (including the fixed
//! pickup/dropoff service time), and the waypoint polyline. The production
//! implementation talks to OpenRouteService with a retry ladder over widening
//! snap radii; when the provider is exhausted the caller degrades to
//! [`straight_line_estimate`] rather than failing the trip.

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::{Coordinate, RouteSummary};
use crate::config::HosConfig;
use crate::models::geo::haversine_miles;

const MILES_PER_KILOMETER: f64 = 0.621371;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Snap radii tried in order before the provider gives up, in meters.
const SEARCH_RADII_METERS: [f64; 4] = [350.0, 1000.0, 2000.0, 5000.0];

/// Route provider failures.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The provider exhausted its retry ladder. Callers should fall back to a
    /// straight-line estimate; this is degraded mode, not a user-facing error.
    #[error("Route provider unavailable: {0}")]
    Unavailable(String),

    /// A location string could not be resolved to coordinates.
    #[error("Could not geocode location: {0}")]
    Geocoding(String),
}

/// External routing service interface.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RouteError>;
}

/// Straight-line fallback: haversine distance at the configured average
/// speed, plus the fixed pickup/dropoff service time.
pub fn straight_line_estimate(
    origin: Coordinate,
    destination: Coordinate,
    config: &HosConfig,
) -> RouteSummary {
    let distance = haversine_miles(origin, destination);
    RouteSummary {
        total_distance_miles: distance,
        total_duration_hours: distance / config.average_speed_mph + config.service_hours(),
        waypoints: vec![origin, destination],
    }
}

// =============================================================================
// OpenRouteService adapter
// =============================================================================

/// Routing via the OpenRouteService directions API.
pub struct OpenRouteService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    /// Fixed pickup + dropoff service hours folded into route durations.
    service_hours: f64,
}

impl OpenRouteService {
    pub fn new(api_key: impl Into<String>, config: &HosConfig) -> Self {
        Self::with_base_url(api_key, "https://api.openrouteservice.org", config)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        config: &HosConfig,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            service_hours: config.service_hours(),
        }
    }

    async fn request_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        radius_meters: f64,
    ) -> Result<RouteSummary, RouteError> {
        let url = format!("{}/v2/directions/driving-car/geojson", self.base_url);
        // ORS expects [lon, lat] pairs.
        let body = serde_json::json!({
            "coordinates": [
                [origin.lon, origin.lat],
                [destination.lon, destination.lat]
            ],
            "radiuses": [radius_meters, radius_meters]
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RouteError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(RouteError::Unavailable(format!(
                "directions request returned HTTP {}",
                response.status()
            )));
        }

        let geojson: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| RouteError::Unavailable(e.to_string()))?;
        let feature = geojson
            .features
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::Unavailable("no routes found".to_string()))?;

        let waypoints = feature
            .geometry
            .coordinates
            .into_iter()
            .filter_map(|pair| match pair.as_slice() {
                // GeoJSON order is [lon, lat].
                [lon, lat, ..] => Some(Coordinate { lat: *lat, lon: *lon }),
                _ => None,
            })
            .collect();

        let summary = feature.properties.summary;
        Ok(RouteSummary {
            total_distance_miles: summary.distance / 1000.0 * MILES_PER_KILOMETER,
            total_duration_hours: summary.duration / SECONDS_PER_HOUR + self.service_hours,
            waypoints,
        })
    }
}

#[async_trait]
impl RouteProvider for OpenRouteService {
    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RouteError> {
        let mut last_error = RouteError::Unavailable("no radius attempted".to_string());
        for radius in SEARCH_RADII_METERS {
            match self.request_route(origin, destination, radius).await {
                Ok(route) => return Ok(route),
                Err(err) => {
                    log::warn!("directions request failed at radius {radius}m: {err}");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    geometry: DirectionsGeometry,
    properties: DirectionsProperties,
}

#[derive(Debug, Deserialize)]
struct DirectionsGeometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct DirectionsProperties {
    summary: DirectionsSummary,
}

#[derive(Debug, Deserialize)]
struct DirectionsSummary {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
}

// =============================================================================
// Geocoding
// =============================================================================

/// Resolves free-text addresses to coordinates. Trips are created from plain
/// location strings, so the service geocodes them before consulting the route
/// provider; failure degrades to a trip without coordinates, never an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinate, RouteError>;
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

/// Geocoder backed by the Nominatim search API.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self::with_base_url("https://nominatim.openstreetmap.org")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinate, RouteError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .header("User-Agent", "hos-rust")
            .send()
            .await
            .map_err(|e| RouteError::Geocoding(e.to_string()))?;
        if !response.status().is_success() {
            return Err(RouteError::Geocoding(format!(
                "geocoder returned HTTP {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| RouteError::Geocoding(e.to_string()))?;
        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::Geocoding(format!("no match for '{address}'")))?;

        let lat: f64 = first
            .lat
            .parse()
            .map_err(|_| RouteError::Geocoding("bad latitude in geocoder response".to_string()))?;
        let lon: f64 = first
            .lon
            .parse()
            .map_err(|_| RouteError::Geocoding("bad longitude in geocoder response".to_string()))?;
        Coordinate::new(lat, lon).map_err(RouteError::Geocoding)
    }
}

/// In-memory geocoder for tests and local development. Unknown addresses
/// come back as geocoding errors, matching a no-match provider response.
pub struct StaticGeocoder {
    entries: Vec<(String, Coordinate)>,
}

impl StaticGeocoder {
    pub fn new(entries: Vec<(String, Coordinate)>) -> Self {
        Self { entries }
    }

    /// A geocoder that resolves nothing; every lookup fails.
    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinate, RouteError> {
        self.entries
            .iter()
            .find(|(known, _)| known == address)
            .map(|(_, coordinate)| *coordinate)
            .ok_or_else(|| RouteError::Geocoding(format!("no match for '{address}'")))
    }
}

// =============================================================================
// Synthetic provider (demo/test only)
// =============================================================================

/// Fabricates plausible routes without any network access.
///
/// Demo and test provider only; never wire this into the production path.
/// Distance is the great-circle distance inflated by a random road factor,
/// and the polyline is a straight interpolation between the endpoints.
pub struct SyntheticRouteProvider {
    config: HosConfig,
}

impl SyntheticRouteProvider {
    pub fn new(config: HosConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RouteProvider for SyntheticRouteProvider {
    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RouteError> {
        use rand::Rng;

        let road_factor = rand::thread_rng().gen_range(1.1..1.3);
        let distance = haversine_miles(origin, destination) * road_factor;

        let segments = 20;
        let waypoints = (0..=segments)
            .map(|i| {
                let t = i as f64 / segments as f64;
                Coordinate {
                    lat: origin.lat + (destination.lat - origin.lat) * t,
                    lon: origin.lon + (destination.lon - origin.lon) * t,
                }
            })
            .collect();

        Ok(RouteSummary {
            total_distance_miles: distance,
            total_duration_hours: distance / self.config.average_speed_mph
                + self.config.service_hours(),
            waypoints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nyc() -> Coordinate {
        Coordinate {
            lat: 40.7128,
            lon: -74.0060,
        }
    }

    fn la() -> Coordinate {
        Coordinate {
            lat: 34.0522,
            lon: -118.2437,
        }
    }

    #[test]
    fn test_straight_line_estimate() {
        let config = HosConfig::default();
        let route = straight_line_estimate(nyc(), la(), &config);

        assert!((route.total_distance_miles - 2445.0).abs() < 10.0);
        let expected_hours = route.total_distance_miles / 60.0 + 2.0;
        assert!((route.total_duration_hours - expected_hours).abs() < 1e-9);
        assert_eq!(route.waypoints.len(), 2);
    }

    #[tokio::test]
    async fn test_synthetic_provider_is_plausible() {
        let provider = SyntheticRouteProvider::new(HosConfig::default());
        let route = provider.get_route(nyc(), la()).await.unwrap();

        let great_circle = haversine_miles(nyc(), la());
        assert!(route.total_distance_miles >= great_circle);
        assert!(route.total_distance_miles <= great_circle * 1.3);
        assert!(route.total_duration_hours > route.total_distance_miles / 60.0);
        assert!(route.waypoints.len() > 2);
        let first = route.waypoints.first().unwrap();
        let last = route.waypoints.last().unwrap();
        assert!(haversine_miles(*first, nyc()) < 1e-6);
        assert!(haversine_miles(*last, la()) < 1e-6);
    }

    #[tokio::test]
    async fn test_static_geocoder_resolves_known_addresses_only() {
        let geocoder = StaticGeocoder::new(vec![("New York, NY".to_string(), nyc())]);

        let hit = geocoder.geocode("New York, NY").await.unwrap();
        assert!(haversine_miles(hit, nyc()) < 1e-6);

        assert!(matches!(
            geocoder.geocode("Atlantis").await,
            Err(RouteError::Geocoding(_))
        ));
    }

    #[test]
    fn test_directions_response_parsing() {
        let body = serde_json::json!({
            "features": [{
                "geometry": {
                    "coordinates": [[-74.0, 40.7], [-75.0, 41.0]]
                },
                "properties": {
                    "summary": { "distance": 160934.4, "duration": 7200.0 }
                }
            }]
        });

        let parsed: DirectionsResponse = serde_json::from_value(body).unwrap();
        let feature = &parsed.features[0];
        assert_eq!(feature.geometry.coordinates.len(), 2);
        assert!((feature.properties.summary.distance - 160934.4).abs() < 1e-6);
    }
}
