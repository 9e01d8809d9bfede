//! Outbound notification relay port.
//!
//! Consumed by the crypto-update handler to forward derived price updates to
//! the external notification service. Failures here are logged by the caller
//! and never affect broadcast or user delivery.

mod http;

use async_trait::async_trait;
use log::debug;
use pricewire_protocol::{Currency, RelayUpdate};
use thiserror::Error;

pub use http::HttpNotificationRelay;

/// Relay delivery failure. Always swallowed by the caller after logging.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("notification relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification relay returned status {status}")]
    Status { status: reqwest::StatusCode },
}

/// Capability to forward a derived price update to the notification service.
#[async_trait]
pub trait NotificationRelay: Send + Sync {
    async fn send_notification(
        &self,
        currency: Currency,
        update: &RelayUpdate,
    ) -> Result<(), RelayError>;
}

/// Relay used when forwarding is disabled: logs the update and drops it.
pub struct NoopNotificationRelay;

#[async_trait]
impl NotificationRelay for NoopNotificationRelay {
    async fn send_notification(
        &self,
        currency: Currency,
        update: &RelayUpdate,
    ) -> Result<(), RelayError> {
        debug!(
            "relay disabled, dropping {} {} quote(s)",
            update.payload.len(),
            currency
        );
        Ok(())
    }
}
