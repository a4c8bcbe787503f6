//! Arithmetic building blocks for the scheduling engine.
//!
//! - [`duration`]: distance/speed/time conversions and per-status hour sums
//! - [`geo`]: great-circle distance along waypoint polylines

pub mod duration;
pub mod geo;

pub use duration::{driving_hours_for, duration_hours, hours_to_duration, minutes_to_duration};
pub use geo::{collapse_duplicate_waypoints, haversine_miles, EARTH_RADIUS_MILES};
