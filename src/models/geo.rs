//! Great-circle geometry over route waypoints.

use crate::api::Coordinate;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance between two coordinates, in miles (haversine).
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Drop consecutive duplicate waypoints.
///
/// Route geometries often repeat a coordinate at segment joins; zero-length
/// segments would otherwise skew cumulative-distance thresholds.
pub fn collapse_duplicate_waypoints(waypoints: &[Coordinate]) -> Vec<Coordinate> {
    let mut collapsed: Vec<Coordinate> = Vec::with_capacity(waypoints.len());
    for &point in waypoints {
        if collapsed.last() != Some(&point) {
            collapsed.push(point);
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }

    #[test]
    fn test_haversine_zero_distance() {
        let p = coord(40.7128, -74.0060);
        assert!(haversine_miles(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_nyc_to_la() {
        // New York to Los Angeles, roughly 2445 statute miles great-circle.
        let nyc = coord(40.7128, -74.0060);
        let la = coord(34.0522, -118.2437);
        let distance = haversine_miles(nyc, la);
        assert!(
            (distance - 2445.0).abs() < 10.0,
            "unexpected NYC-LA distance: {distance}"
        );
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = coord(41.8781, -87.6298);
        let b = coord(39.7392, -104.9903);
        assert!((haversine_miles(a, b) - haversine_miles(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_collapse_duplicate_waypoints() {
        let points = vec![
            coord(0.0, 0.0),
            coord(0.0, 0.0),
            coord(1.0, 1.0),
            coord(1.0, 1.0),
            coord(1.0, 1.0),
            coord(2.0, 2.0),
        ];
        let collapsed = collapse_duplicate_waypoints(&points);
        assert_eq!(collapsed.len(), 3);
        assert_eq!(collapsed[1], coord(1.0, 1.0));
    }

    #[test]
    fn test_collapse_keeps_non_consecutive_repeats() {
        let points = vec![coord(0.0, 0.0), coord(1.0, 1.0), coord(0.0, 0.0)];
        assert_eq!(collapse_duplicate_waypoints(&points).len(), 3);
    }
}
