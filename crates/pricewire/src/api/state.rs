//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenValidator;
use crate::dispatch::EventDispatcher;
use crate::realtime::RealtimeHub;

/// Application state shared across all handlers.
///
/// Every collaborator is injected explicitly at construction, so the
/// dependency graph is static and tests can swap any piece.
#[derive(Clone)]
pub struct AppState {
    /// Event dispatcher with the routing table built at startup.
    pub dispatcher: Arc<EventDispatcher>,
    /// Realtime hub owning both channel classes.
    pub hub: Arc<RealtimeHub>,
    /// Credential validator for the user channel.
    pub auth: Arc<dyn TokenValidator>,
    /// Server start time, reported by the health endpoint.
    pub started_at: Instant,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        dispatcher: Arc<EventDispatcher>,
        hub: Arc<RealtimeHub>,
        auth: Arc<dyn TokenValidator>,
    ) -> Self {
        Self {
            dispatcher,
            hub,
            auth,
            started_at: Instant::now(),
            allowed_origins: Vec::new(),
        }
    }

    /// Set the origins the CORS layer allows.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}
