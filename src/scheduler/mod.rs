//! Duty-schedule generator.
//!
//! This module is the core of the backend: a single-threaded state machine
//! that consumes a route summary and a trip start time and produces an ordered
//! sequence of duty intervals obeying the Hours-of-Service rules. Every
//! generated calendar day is covered exactly once across the four duty states,
//! from the first day's midnight through the final day's midnight boundary.
//!
//! The walk through a day is always the same shape:
//!
//! ```text
//! OFF   morning routine          (pickup location on day 1, en route after)
//! ON    pre-trip inspection
//! D     session 1  (<= 4 h)
//! OFF   30-minute break          (between sessions only)
//! D     session 2  ...
//! ON    post-trip inspection     (final day only, at dropoff)
//! OFF   parking and meal
//! SB    fill to midnight
//! ```
//!
//! Generation is pure: it never touches the repository. Persistence and
//! summary aggregation are orchestrated by `services::trip_service`.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::api::{DutyInterval, DutyStatus, RouteSummary, Trip, TripId};
use crate::config::HosConfig;
use crate::models::duration::{hours_to_duration, minutes_to_duration};


/// Errors from schedule generation. The schedule is all-or-nothing: on error
/// no intervals are produced and nothing may be persisted.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Route distance or duration is missing, non-positive, or not finite.
    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: String },

    /// Generation exceeded the day cap; the route is malformed or absurd.
    #[error("Schedule generation exceeded the {max_days}-day cap")]
    CapacityExceeded { max_days: u32 },
}

/// Remaining driving time below this threshold counts as zero.
const REMAINING_EPSILON_HOURS: f64 = 1e-9;

/// Generate the full multi-day duty schedule for a trip.
///
/// `trip_id` is the stored trip's id, passed separately so every interval is
/// stamped with a real id even though `Trip` carries it as an `Option`.
/// `start` is the moment the driver begins the first day's routine; the
/// schedule additionally covers the gap from that day's midnight with a
/// leading off-duty interval. The driving time is the route duration minus the
/// fixed pickup/dropoff service overhead, which is emitted as on-duty
/// inspection blocks instead.
///
/// Returns intervals strictly ordered by start time, non-overlapping and
/// gapless over the generated span.
pub fn generate_schedule(
    trip_id: TripId,
    trip: &Trip,
    route: &RouteSummary,
    start: DateTime<Utc>,
    config: &HosConfig,
) -> Result<Vec<DutyInterval>, GenerateError> {
    let mut remaining_hours = validate_route(route, config)?;

    let mut intervals = Vec::new();
    let mut cursor = start;
    let mut day_count: u32 = 0;

    while remaining_hours > REMAINING_EPSILON_HOURS {
        day_count += 1;
        if day_count > config.max_schedule_days {
            return Err(GenerateError::CapacityExceeded {
                max_days: config.max_schedule_days,
            });
        }
        let first_day = day_count == 1;

        // Day 1 starting mid-day: cover the gap from midnight so the first
        // day still sums to 24 hours.
        if first_day {
            let midnight = day_start(cursor);
            if midnight < cursor {
                intervals.push(DutyInterval::new(
                    trip_id,
                    DutyStatus::Off,
                    midnight,
                    cursor,
                    trip.pickup_location.clone(),
                    "Off duty before trip start",
                ));
            }
        }

        let day_location = if first_day {
            trip.pickup_location.clone()
        } else {
            "En route".to_string()
        };
        let day_date = cursor.date_naive();

        // 1. Morning off-duty routine.
        cursor = push_block(
            &mut intervals,
            trip_id,
            DutyStatus::Off,
            cursor,
            minutes_to_duration(config.morning_routine_minutes),
            &day_location,
            "Morning routine / Breakfast",
        );

        // 2. On-duty pre-trip inspection.
        cursor = push_block(
            &mut intervals,
            trip_id,
            DutyStatus::OnDuty,
            cursor,
            minutes_to_duration(config.pre_trip_inspection_minutes),
            &day_location,
            "Pre-trip TIV Inspection",
        );

        // 3. Driving sessions with interleaved breaks.
        let day_hours = remaining_hours.min(config.max_driving_hours_per_day);
        let sessions = (day_hours / config.break_interval_hours).ceil() as usize;
        for session in 0..sessions {
            let already_driven = session as f64 * config.break_interval_hours;
            let session_hours =
                (day_hours - already_driven).min(config.break_interval_hours);
            if session_hours <= REMAINING_EPSILON_HOURS {
                // Degenerate zero-length session (day_hours is an exact
                // multiple of the break interval).
                continue;
            }

            cursor = push_block(
                &mut intervals,
                trip_id,
                DutyStatus::Driving,
                cursor,
                hours_to_duration(session_hours),
                "Highway",
                &format!("Driving session {}", session + 1),
            );

            if session + 1 < sessions {
                cursor = push_block(
                    &mut intervals,
                    trip_id,
                    DutyStatus::Off,
                    cursor,
                    minutes_to_duration(config.break_duration_minutes),
                    "Rest Area",
                    "Fuel stop / Break",
                );
            }
        }
        remaining_hours -= day_hours;

        // 4. Post-trip inspection at the dropoff, final day only.
        if remaining_hours <= REMAINING_EPSILON_HOURS {
            cursor = push_block(
                &mut intervals,
                trip_id,
                DutyStatus::OnDuty,
                cursor,
                minutes_to_duration(config.post_trip_inspection_minutes),
                &trip.dropoff_location,
                "Post-trip TIV Inspection / Dropoff",
            );
        }

        // 5. Parking, meal and rest.
        cursor = push_block(
            &mut intervals,
            trip_id,
            DutyStatus::Off,
            cursor,
            minutes_to_duration(config.end_of_day_parking_minutes),
            "Truck Stop",
            "Parking, meal and rest",
        );

        // 6. Sleeper berth fills whatever is left of the day. Activity that
        // already spilled past midnight is a detectable anomaly, not
        // something to truncate silently.
        let end_of_day = midnight_utc(day_date) + Duration::days(1);
        if cursor < end_of_day {
            cursor = push_block(
                &mut intervals,
                trip_id,
                DutyStatus::SleeperBerth,
                cursor,
                end_of_day - cursor,
                "Truck Stop Sleeper",
                "Sleeper berth rest",
            );
        } else {
            log::warn!(
                "day {} activity for trip {} ran past midnight ({} >= {}); skipping sleeper fill",
                day_count,
                trip_id,
                cursor,
                end_of_day
            );
        }
    }

    Ok(intervals)
}

/// Validate the route and return the total driving hours to schedule.
fn validate_route(route: &RouteSummary, config: &HosConfig) -> Result<f64, GenerateError> {
    if !route.total_distance_miles.is_finite() || route.total_distance_miles <= 0.0 {
        return Err(GenerateError::InvalidRoute {
            reason: format!(
                "total distance must be positive, got {}",
                route.total_distance_miles
            ),
        });
    }
    if !route.total_duration_hours.is_finite() || route.total_duration_hours <= 0.0 {
        return Err(GenerateError::InvalidRoute {
            reason: format!(
                "total duration must be positive, got {}",
                route.total_duration_hours
            ),
        });
    }

    let driving_hours = route.total_duration_hours - config.service_hours();
    if driving_hours <= 0.0 {
        return Err(GenerateError::InvalidRoute {
            reason: format!(
                "route duration {}h does not exceed the fixed service time {}h",
                route.total_duration_hours,
                config.service_hours()
            ),
        });
    }
    Ok(driving_hours)
}

/// Append one activity block starting at `cursor`; returns the new cursor.
fn push_block(
    intervals: &mut Vec<DutyInterval>,
    trip_id: TripId,
    status: DutyStatus,
    cursor: DateTime<Utc>,
    length: Duration,
    location: &str,
    remarks: &str,
) -> DateTime<Utc> {
    let end = cursor + length;
    intervals.push(DutyInterval::new(
        trip_id, status, cursor, end, location, remarks,
    ));
    end
}

/// Midnight at the start of the given instant's calendar day.
fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    midnight_utc(at.date_naive())
}

fn midnight_utc(date: chrono::NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
