//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::TripService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Trip service wired with the repository and external collaborators.
    pub trips: Arc<TripService>,
}

impl AppState {
    /// Create a new application state around the given trip service.
    pub fn new(trips: Arc<TripService>) -> Self {
        Self { trips }
    }
}
