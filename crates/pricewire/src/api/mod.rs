//! HTTP/WebSocket API surface.
//!
//! Provides the inbound event submission endpoint and the upgrade endpoints
//! for both real-time channel classes.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
