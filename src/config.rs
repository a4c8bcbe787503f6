//! Regulatory and planning constants for schedule generation.
//!
//! The source of these limits is the FMCSA Hours-of-Service rules plus the
//! fixed activity blocks the generator inserts around driving sessions. They
//! are centralized here as a single immutable configuration injected into the
//! generator, aggregator, and fuel-stop planner, and can be overridden from a
//! TOML configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tolerance when checking that a day's totals sum to 24 hours.
pub const DAY_TOTAL_EPSILON_HOURS: f64 = 0.05;

/// Immutable configuration for HOS schedule generation and route planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HosConfig {
    /// Maximum driving hours per calendar day (11-hour rule).
    pub max_driving_hours_per_day: f64,
    /// A break is required after this many cumulative driving hours.
    pub break_interval_hours: f64,
    /// Length of the mandatory driving break.
    pub break_duration_minutes: u32,
    /// On-duty pre-trip vehicle inspection.
    pub pre_trip_inspection_minutes: u32,
    /// On-duty post-trip inspection and dropoff, final day only.
    pub post_trip_inspection_minutes: u32,
    /// Off-duty morning routine before the duty day starts.
    pub morning_routine_minutes: u32,
    /// Off-duty parking and meal block at the end of each day.
    pub end_of_day_parking_minutes: u32,
    /// Hard cap on generated days; exceeding it signals a malformed route.
    pub max_schedule_days: u32,
    /// Assumed average highway speed, used for fallback estimates.
    pub average_speed_mph: f64,
    /// Distance between planned fuel stops.
    pub fuel_stop_interval_miles: f64,
    /// Fixed service time at pickup, included in route duration.
    pub pickup_service_hours: f64,
    /// Fixed service time at dropoff, included in route duration.
    pub dropoff_service_hours: f64,
}

impl Default for HosConfig {
    fn default() -> Self {
        Self {
            max_driving_hours_per_day: 11.0,
            break_interval_hours: 4.0,
            break_duration_minutes: 30,
            pre_trip_inspection_minutes: 30,
            post_trip_inspection_minutes: 30,
            morning_routine_minutes: 30,
            end_of_day_parking_minutes: 30,
            max_schedule_days: 14,
            average_speed_mph: 60.0,
            fuel_stop_interval_miles: 1000.0,
            pickup_service_hours: 1.0,
            dropoff_service_hours: 1.0,
        }
    }
}

impl HosConfig {
    /// Load configuration from a TOML file; missing keys take their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: HosConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Total fixed service time (pickup + dropoff) in hours.
    pub fn service_hours(&self) -> f64 {
        self.pickup_service_hours + self.dropoff_service_hours
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_driving_hours_per_day <= 0.0 {
            anyhow::bail!("max_driving_hours_per_day must be positive");
        }
        if self.break_interval_hours <= 0.0 {
            anyhow::bail!("break_interval_hours must be positive");
        }
        if self.average_speed_mph <= 0.0 {
            anyhow::bail!("average_speed_mph must be positive");
        }
        if self.fuel_stop_interval_miles <= 0.0 {
            anyhow::bail!("fuel_stop_interval_miles must be positive");
        }
        if self.max_schedule_days == 0 {
            anyhow::bail!("max_schedule_days must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_regulatory_limits() {
        let config = HosConfig::default();
        assert_eq!(config.max_driving_hours_per_day, 11.0);
        assert_eq!(config.break_interval_hours, 4.0);
        assert_eq!(config.break_duration_minutes, 30);
        assert_eq!(config.max_schedule_days, 14);
        assert_eq!(config.service_hours(), 2.0);
    }

    #[test]
    fn test_from_toml_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "fuel_stop_interval_miles = 500.0\nmorning_routine_minutes = 45"
        )
        .unwrap();

        let config = HosConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.fuel_stop_interval_miles, 500.0);
        assert_eq!(config.morning_routine_minutes, 45);
        // Untouched keys keep their defaults.
        assert_eq!(config.max_driving_hours_per_day, 11.0);
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "average_speed_mph = 0.0").unwrap();
        assert!(HosConfig::from_toml_file(file.path()).is_err());
    }
}
