//! Duration arithmetic for duty intervals.
//!
//! All durations in the log model are fractional hours; chrono `Duration` is
//! used at interval boundaries. Conversions go through milliseconds so that
//! sub-minute activity blocks survive the round trip.

use crate::api::{DutyInterval, DutyStatus};
use chrono::Duration;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Convert fractional hours to a chrono `Duration`.
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * MILLIS_PER_HOUR).round() as i64)
}

/// Convert whole minutes to a chrono `Duration`.
pub fn minutes_to_duration(minutes: u32) -> Duration {
    Duration::minutes(minutes as i64)
}

/// Convert a chrono `Duration` to fractional hours.
pub fn duration_hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Driving time in hours needed to cover `miles` at `mph`.
pub fn driving_hours_for(miles: f64, mph: f64) -> f64 {
    miles / mph
}

/// Sum the durations of all intervals with the given duty status, in hours.
pub fn sum_hours_by_status(intervals: &[DutyInterval], status: DutyStatus) -> f64 {
    intervals
        .iter()
        .filter(|interval| interval.status == status)
        .map(|interval| interval.duration_hours())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TripId;
    use chrono::{TimeZone, Utc};

    fn interval(status: DutyStatus, start_hour: u32, end_hour: u32) -> DutyInterval {
        DutyInterval::new(
            TripId::new(1),
            status,
            Utc.with_ymd_and_hms(2025, 4, 26, start_hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 26, end_hour, 0, 0).unwrap(),
            "Highway",
            "test",
        )
    }

    #[test]
    fn test_hours_roundtrip() {
        let original = 4.333;
        let roundtrip = duration_hours(hours_to_duration(original));
        assert!((original - roundtrip).abs() < 1e-6);
    }

    #[test]
    fn test_minutes_to_duration() {
        assert_eq!(minutes_to_duration(30), Duration::minutes(30));
    }

    #[test]
    fn test_driving_hours_for() {
        assert!((driving_hours_for(500.0, 60.0) - 8.333333).abs() < 1e-5);
        assert!((driving_hours_for(2800.0, 60.0) - 46.666666).abs() < 1e-5);
    }

    #[test]
    fn test_sum_hours_by_status() {
        let intervals = vec![
            interval(DutyStatus::Driving, 8, 12),
            interval(DutyStatus::Off, 12, 13),
            interval(DutyStatus::Driving, 13, 17),
        ];
        assert!((sum_hours_by_status(&intervals, DutyStatus::Driving) - 8.0).abs() < 1e-9);
        assert!((sum_hours_by_status(&intervals, DutyStatus::Off) - 1.0).abs() < 1e-9);
        assert_eq!(sum_hours_by_status(&intervals, DutyStatus::OnDuty), 0.0);
    }
}
