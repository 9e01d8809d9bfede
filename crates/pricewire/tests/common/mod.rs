//! Test utilities and common setup.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use pricewire::api::{self, AppState};
use pricewire::auth::{JwtValidator, TokenValidator};
use pricewire::dispatch::{EventDispatcher, EventHandler};
use pricewire::handlers::{CryptoUpdateHandler, UserNotificationHandler};
use pricewire::realtime::RealtimeHub;
use pricewire::relay::{NotificationRelay, RelayError};
use pricewire_protocol::{Currency, RelayUpdate};

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Relay stub that accepts everything without touching the network.
struct NullRelay;

#[async_trait]
impl NotificationRelay for NullRelay {
    async fn send_notification(
        &self,
        _currency: Currency,
        _update: &RelayUpdate,
    ) -> Result<(), RelayError> {
        Ok(())
    }
}

pub fn test_validator() -> JwtValidator {
    JwtValidator::new(TEST_JWT_SECRET)
}

/// Fully wired application state, plus a handle on the hub for assertions.
pub fn test_state() -> (AppState, Arc<RealtimeHub>) {
    let hub = Arc::new(RealtimeHub::new());
    hub.open();

    let relay: Arc<dyn NotificationRelay> = Arc::new(NullRelay);
    let handlers: Vec<Arc<dyn EventHandler>> = vec![
        Arc::new(CryptoUpdateHandler::new(hub.clone(), relay)),
        Arc::new(UserNotificationHandler::new(hub.clone())),
    ];
    let dispatcher = Arc::new(EventDispatcher::new(handlers));
    let auth: Arc<dyn TokenValidator> = Arc::new(test_validator());

    (AppState::new(dispatcher, hub.clone(), auth), hub)
}

/// Create a test application with all handlers registered.
pub fn test_app() -> Router {
    let (state, _hub) = test_state();
    api::create_router(state)
}

/// Application with only the price-update handler registered, for exercising
/// the unrouted-kind path.
pub fn price_only_app() -> Router {
    let hub = Arc::new(RealtimeHub::new());
    hub.open();

    let relay: Arc<dyn NotificationRelay> = Arc::new(NullRelay);
    let handlers: Vec<Arc<dyn EventHandler>> =
        vec![Arc::new(CryptoUpdateHandler::new(hub.clone(), relay))];
    let dispatcher = Arc::new(EventDispatcher::new(handlers));
    let auth: Arc<dyn TokenValidator> = Arc::new(test_validator());

    api::create_router(AppState::new(dispatcher, hub, auth))
}
