//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::NightPlanner;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Planner shared by every request
    pub planner: Arc<NightPlanner>,
}

impl AppState {
    /// Create a new application state with the given planner.
    pub fn new(planner: Arc<NightPlanner>) -> Self {
        Self { planner }
    }
}
