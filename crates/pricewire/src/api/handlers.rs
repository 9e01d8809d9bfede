//! API request handlers.

use axum::{
    Json,
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::headers::Cookie;
use pricewire_protocol::Event;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::auth;
use crate::realtime::{run_feed_session, run_user_session};

use super::error::ApiResult;
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Health check.
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Response for a dispatched event.
#[derive(Debug, Serialize)]
pub struct SubmitEventResponse {
    pub status: &'static str,
    pub kind: String,
}

/// Submit an event envelope for dispatch.
///
/// POST /events
///
/// The envelope is validated before the dispatcher sees it: an unknown kind,
/// a payload that does not match the kind's shape, or an empty price-record
/// sequence is rejected here.
#[instrument(skip(state, body))]
pub async fn submit_event(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<SubmitEventResponse>> {
    let event = Event::from_value(body)?;
    event.validate()?;

    state.dispatcher.dispatch(&event).await?;

    Ok(Json(SubmitEventResponse {
        status: "dispatched",
        kind: event.kind().to_string(),
    }))
}

/// Public feed upgrade endpoint. Admits any connection.
///
/// GET /ws/feed
pub async fn feed_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_feed_session(socket, state.hub.clone()))
}

/// Authenticated user channel upgrade endpoint.
///
/// GET /ws/user
///
/// The admission gate runs before the upgrade is accepted; a missing or
/// rejected credential turns the handshake away with 401.
pub async fn user_ws(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let user = auth::admit(
        cookies.as_ref().map(|TypedHeader(jar)| jar),
        state.auth.as_ref(),
    )
    .await?;

    info!(user_id = %user.user_id, "user channel connection admitted");

    Ok(ws.on_upgrade(move |socket| run_user_session(socket, state.hub.clone(), user.user_id)))
}
