//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` holds the single `SessionManager` instance for the process and
//! is handed to every consumer of session state explicitly — no ambient
//! globals. Clone is cheap; the manager is Arc-wrapped.

use std::sync::Arc;

use crate::services::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
}

impl AppState {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
