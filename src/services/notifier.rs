//! Notification publication after state mutations.
//!
//! The actual WebSocket fan-out lives in an external gateway; the backend only
//! publishes to named channels. Publication is fire-and-forget: a failed or
//! missing publish must never roll back or fail the underlying mutation, so
//! the trait is infallible by construction.

use serde::Serialize;

use crate::api::TripId;

/// Channel receiving events for every trip.
pub const ALL_TRIPS_CHANNEL: &str = "all_trips";

/// Channel receiving events for a single trip.
pub fn trip_channel(trip_id: TripId) -> String {
    format!("trip:{trip_id}")
}

/// Event types published after mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TripCreated,
    TripUpdated,
    LogCreated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TripCreated => "trip_created",
            EventType::TripUpdated => "trip_updated",
            EventType::LogCreated => "log_created",
        }
    }
}

/// Publish interface consumed by the trip services.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, channel: &str, event: EventType, payload: serde_json::Value);
}

/// Default publisher: emits structured log lines. Stands in for the gateway
/// in local development and keeps the publish path observable.
pub struct LogPublisher;

impl NotificationPublisher for LogPublisher {
    fn publish(&self, channel: &str, event: EventType, payload: serde_json::Value) {
        log::info!(
            "notify channel={} event={} payload={}",
            channel,
            event.as_str(),
            payload
        );
    }
}

/// Records published events in memory. Used by tests to assert on the
/// notification stream.
#[derive(Default)]
pub struct RecordingPublisher {
    events: parking_lot::Mutex<Vec<(String, EventType, serde_json::Value)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, EventType, serde_json::Value)> {
        self.events.lock().clone()
    }
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(&self, channel: &str, event: EventType, payload: serde_json::Value) {
        self.events.lock().push((channel.to_string(), event, payload));
    }
}
