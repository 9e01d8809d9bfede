//! Real-time channel management.
//!
//! Two channel classes share this module: the public price feed, which admits
//! any connection, and the authenticated user channel, which binds each
//! connection to a validated identity. The hub owns both connection tables
//! and performs all delivery; the session loops shuttle frames between the
//! hub and the underlying WebSockets.

mod delivery;
mod hub;
mod session;

pub use delivery::{Delivery, DeliveryError};
pub use hub::{ConnectionId, RealtimeHub};
pub use session::{run_feed_session, run_user_session};
