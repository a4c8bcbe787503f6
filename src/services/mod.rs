//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository. The scheduler
//! itself is pure; everything that talks to external collaborators (route
//! providers, station lookup, notification fan-out) or to the repository lives
//! here.

pub mod daily_summary;

pub mod fuel_planner;

pub mod notifier;

pub mod route_provider;
pub mod station_finder;

pub mod trip_service;

pub use daily_summary::{summarize_day, SummaryError};
pub use fuel_planner::plan_fuel_stops;
pub use notifier::{
    trip_channel, EventType, LogPublisher, NotificationPublisher, RecordingPublisher,
    ALL_TRIPS_CHANNEL,
};
pub use route_provider::{
    straight_line_estimate, Geocoder, NominatimGeocoder, OpenRouteService, RouteError,
    RouteProvider, StaticGeocoder, SyntheticRouteProvider,
};
pub use station_finder::{
    OverpassStationFinder, StaticStationFinder, StationFinder, StationLookupError,
};
pub use trip_service::{
    DailyLog, NewLogRequest, NewTripRequest, RoutePlan, TripService, TripServiceError,
};


#[cfg(test)]
#[path = "fuel_planner_tests.rs"]
mod fuel_planner_tests;
