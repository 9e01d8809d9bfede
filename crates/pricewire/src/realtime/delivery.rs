//! Delivery port consumed by the domain handlers.

use async_trait::async_trait;
use pricewire_protocol::{FeedChannel, PriceUpdate, UserNotice};
use thiserror::Error;

/// Error surfaced by delivery calls.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Delivery was attempted before the channel classes were opened. This is
    /// a programming error and should not occur in steady state.
    #[error("realtime channels are not initialized")]
    NotInitialized,
}

/// Capability to fan a message out to the public feed or address it to a
/// single identified user.
///
/// Both operations are best-effort: a connection mid-disconnect may silently
/// miss a broadcast, and a targeted send for an unbound user is a no-op.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Send `update` to every currently-connected public feed connection,
    /// tagged with the given sub-channel.
    async fn broadcast(&self, channel: FeedChannel, update: PriceUpdate)
    -> Result<(), DeliveryError>;

    /// Deliver `notice` to the user's live connection, if any.
    async fn send_to_user(&self, user_id: &str, notice: UserNotice) -> Result<(), DeliveryError>;
}
