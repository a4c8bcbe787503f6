//! Public API surface for the Rust backend.
//!
//! This file consolidates the domain types shared between the scheduler,
//! services, repository, and HTTP layers. All types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Trip identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TripId(pub i64);

/// Driver identifier (owned by the external auth system).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub i64);

impl TripId {
    pub fn new(value: i64) -> Self {
        TripId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl DriverId {
    pub fn new(value: i64) -> Self {
        DriverId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TripId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TripId> for i64 {
    fn from(id: TripId) -> Self {
        id.0
    }
}

/// Duty status of a driver during one interval of the day.
///
/// Serialized with the FMCSA log-sheet codes used on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DutyStatus {
    /// Off duty
    #[serde(rename = "OFF")]
    Off,
    /// Sleeper berth
    #[serde(rename = "SB")]
    SleeperBerth,
    /// Driving
    #[serde(rename = "D")]
    Driving,
    /// On duty, not driving
    #[serde(rename = "ON")]
    OnDuty,
}

impl DutyStatus {
    /// Human-readable label, matching the log sheet rows.
    pub fn label(&self) -> &'static str {
        match self {
            DutyStatus::Off => "Off Duty",
            DutyStatus::SleeperBerth => "Sleeper Berth",
            DutyStatus::Driving => "Driving",
            DutyStatus::OnDuty => "On Duty (Not Driving)",
        }
    }
}

impl std::fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trip lifecycle status. Transitions are monotonic:
/// `NotStarted -> InProgress -> Completed`, with no regression once completed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripStatus {
    #[serde(rename = "NOT_STARTED")]
    NotStarted,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "COMPLETED")]
    Completed,
}

/// Geographic coordinate (latitude, longitude) in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(Self { lat, lon })
    }
}

/// A commercial driving trip from pickup to dropoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Database identifier, `None` until stored.
    pub id: Option<TripId>,
    /// Assigned driver; trips may exist unassigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverId>,
    /// Last reported location of the vehicle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_coordinates: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_coordinates: Option<Coordinate>,
    /// Hours already used in the rolling 70-hour/8-day cycle (0-70).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_cycle_used: Option<f64>,
    /// Total route distance in miles, computed at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<f64>,
    /// Estimated total duty time in hours, including pickup/dropoff service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_driving_time: Option<f64>,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Create a new, unstored trip in the `NotStarted` state.
    ///
    /// Rejects a cycle-hours value outside the regulatory 0-70 range.
    pub fn new(
        pickup_location: impl Into<String>,
        dropoff_location: impl Into<String>,
        current_cycle_used: Option<f64>,
    ) -> Result<Self, String> {
        if let Some(cycle) = current_cycle_used {
            if !(0.0..=70.0).contains(&cycle) {
                return Err("current_cycle_used must be between 0 and 70 hours".to_string());
            }
        }
        let pickup_location = pickup_location.into();
        Ok(Self {
            id: None,
            driver: None,
            current_location: Some(pickup_location.clone()),
            pickup_location,
            dropoff_location: dropoff_location.into(),
            pickup_coordinates: None,
            dropoff_coordinates: None,
            current_cycle_used,
            total_distance: None,
            estimated_driving_time: None,
            status: TripStatus::NotStarted,
            created_at: Utc::now(),
        })
    }
}

/// One interval of a driver's duty log. Belongs to exactly one trip.
///
/// Invariants: `end_time > start_time`; the `date` field is always the
/// calendar date of `start_time` and is recomputed whenever the start moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyInterval {
    pub trip_id: TripId,
    pub status: DutyStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub remarks: String,
    /// Calendar date derived from `start_time`.
    pub date: NaiveDate,
}

impl DutyInterval {
    pub fn new(
        trip_id: TripId,
        status: DutyStatus,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            trip_id,
            status,
            start_time,
            end_time,
            location: location.into(),
            remarks: remarks.into(),
            date: start_time.date_naive(),
        }
    }

    /// Move the interval start, keeping the derived date consistent.
    pub fn set_start_time(&mut self, start_time: DateTime<Utc>) {
        self.start_time = start_time;
        self.date = start_time.date_naive();
    }

    /// Interval length in fractional hours.
    pub fn duration_hours(&self) -> f64 {
        crate::models::duration::duration_hours(self.end_time - self.start_time)
    }
}

/// Per-day log sheet totals. Keyed by (trip, date), one row per day.
///
/// For any fully generated day the four totals sum to 24.0 within a small
/// epsilon; a violation signals an upstream generation defect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub trip_id: TripId,
    pub date: NaiveDate,
    pub driving_hours: f64,
    pub on_duty_hours: f64,
    pub off_duty_hours: f64,
    pub sleeper_berth_hours: f64,
}

impl DailySummary {
    /// Sum of the four per-status totals.
    pub fn total_hours(&self) -> f64 {
        self.driving_hours + self.on_duty_hours + self.off_duty_hours + self.sleeper_berth_hours
    }
}

/// Route summary returned by a route provider.
///
/// External input to the generator; not persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Total route distance in miles.
    pub total_distance_miles: f64,
    /// Total duty duration in hours, including fixed pickup/dropoff service.
    pub total_duration_hours: f64,
    /// Ordered polyline of route waypoints.
    pub waypoints: Vec<Coordinate>,
}

/// A fuel station near a planned stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

/// A planned refueling stop along a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelStop {
    /// Waypoint nearest the distance threshold.
    pub location: Coordinate,
    /// Cumulative route distance from the origin, in miles.
    pub distance_from_start: f64,
    /// Up to five nearby stations, sorted by distance; may be empty.
    pub nearby_stations: Vec<Station>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trip_id_roundtrip() {
        let id = TripId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_duty_status_wire_codes() {
        assert_eq!(serde_json::to_string(&DutyStatus::Driving).unwrap(), "\"D\"");
        assert_eq!(serde_json::to_string(&DutyStatus::Off).unwrap(), "\"OFF\"");
        assert_eq!(
            serde_json::to_string(&DutyStatus::SleeperBerth).unwrap(),
            "\"SB\""
        );
        assert_eq!(serde_json::to_string(&DutyStatus::OnDuty).unwrap(), "\"ON\"");

        let status: DutyStatus = serde_json::from_str("\"SB\"").unwrap();
        assert_eq!(status, DutyStatus::SleeperBerth);
    }

    #[test]
    fn test_trip_status_wire_codes() {
        assert_eq!(
            serde_json::to_string(&TripStatus::NotStarted).unwrap(),
            "\"NOT_STARTED\""
        );
        assert_eq!(
            serde_json::to_string(&TripStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(40.7, -74.0).is_ok());
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
    }

    #[test]
    fn test_trip_cycle_hours_validation() {
        assert!(Trip::new("New York, NY", "Los Angeles, CA", Some(35.0)).is_ok());
        assert!(Trip::new("New York, NY", "Los Angeles, CA", Some(71.0)).is_err());
        assert!(Trip::new("New York, NY", "Los Angeles, CA", Some(-1.0)).is_err());
        assert!(Trip::new("New York, NY", "Los Angeles, CA", None).is_ok());
    }

    #[test]
    fn test_interval_date_follows_start_time() {
        let start = Utc.with_ymd_and_hms(2025, 4, 26, 23, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 4, 27, 1, 0, 0).unwrap();
        let mut interval = DutyInterval::new(
            TripId::new(1),
            DutyStatus::Driving,
            start,
            end,
            "Highway",
            "Driving session 1",
        );
        assert_eq!(interval.date, start.date_naive());

        let new_start = Utc.with_ymd_and_hms(2025, 4, 27, 0, 30, 0).unwrap();
        interval.set_start_time(new_start);
        assert_eq!(interval.date, new_start.date_naive());
    }

    #[test]
    fn test_daily_summary_total() {
        let summary = DailySummary {
            trip_id: TripId::new(1),
            date: NaiveDate::from_ymd_opt(2025, 4, 26).unwrap(),
            driving_hours: 11.0,
            on_duty_hours: 1.0,
            off_duty_hours: 2.0,
            sleeper_berth_hours: 10.0,
        };
        assert!((summary.total_hours() - 24.0).abs() < 1e-9);
    }
}
