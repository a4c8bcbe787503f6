//! Daily summary aggregation.
//!
//! Consumes the interval sequence for one calendar day and produces per-status
//! hour totals. The aggregator only detects inconsistencies; it never corrects
//! them. A full generated day must sum to 24 hours within
//! [`DAY_TOTAL_EPSILON_HOURS`](crate::config::DAY_TOTAL_EPSILON_HOURS); a
//! violation signals an upstream generation defect and is reported to the
//! caller as a warning-level condition, never a fatal one.

use chrono::NaiveDate;

use crate::api::{DailySummary, DutyInterval, DutyStatus, TripId};
use crate::config::DAY_TOTAL_EPSILON_HOURS;
use crate::models::duration::sum_hours_by_status;

/// Aggregation failures. `IncompleteDay` carries the computed summary so that
/// callers can log the data-integrity warning and still use the totals.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("No duty intervals recorded for {date}")]
    NoIntervals { date: NaiveDate },

    #[error("Day {date} sums to {total_hours:.2}h instead of 24h")]
    IncompleteDay {
        date: NaiveDate,
        total_hours: f64,
        summary: DailySummary,
    },
}

/// Sum interval durations by duty status for all intervals whose derived date
/// equals `date`. Idempotent: the same interval set always yields the same
/// summary.
pub fn summarize_day(
    trip_id: TripId,
    date: NaiveDate,
    intervals: &[DutyInterval],
) -> Result<DailySummary, SummaryError> {
    let day: Vec<DutyInterval> = intervals
        .iter()
        .filter(|interval| interval.date == date)
        .cloned()
        .collect();
    if day.is_empty() {
        return Err(SummaryError::NoIntervals { date });
    }

    let summary = DailySummary {
        trip_id,
        date,
        driving_hours: sum_hours_by_status(&day, DutyStatus::Driving),
        on_duty_hours: sum_hours_by_status(&day, DutyStatus::OnDuty),
        off_duty_hours: sum_hours_by_status(&day, DutyStatus::Off),
        sleeper_berth_hours: sum_hours_by_status(&day, DutyStatus::SleeperBerth),
    };

    let total_hours = summary.total_hours();
    if (total_hours - 24.0).abs() > DAY_TOTAL_EPSILON_HOURS {
        return Err(SummaryError::IncompleteDay {
            date,
            total_hours,
            summary,
        });
    }
    Ok(summary)
}

/// Like [`summarize_day`] but tolerates an incomplete day, logging the
/// integrity warning and returning the computed totals anyway. Used where an
/// inconsistent day must not block the caller (manual log queries,
/// regeneration after partial driver submissions).
pub fn summarize_day_lenient(
    trip_id: TripId,
    date: NaiveDate,
    intervals: &[DutyInterval],
) -> Result<DailySummary, SummaryError> {
    match summarize_day(trip_id, date, intervals) {
        Ok(summary) => Ok(summary),
        Err(SummaryError::IncompleteDay {
            date,
            total_hours,
            summary,
        }) => {
            log::warn!(
                "trip {} day {} sums to {:.2}h instead of 24h; storing as computed",
                trip_id,
                date,
                total_hours
            );
            Ok(summary)
        }
        Err(err) => Err(err),
    }
}
