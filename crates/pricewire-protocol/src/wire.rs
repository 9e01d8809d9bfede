//! Server-to-client frames and outbound relay payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{PriceQuote, PriceRecord};

/// Currency a price update is denominated in. Doubles as the tag the
/// notification relay receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Eur,
    Usd,
}

impl Currency {
    /// The public feed sub-channel carrying this currency's updates.
    pub fn feed_channel(self) -> FeedChannel {
        match self {
            Currency::Eur => FeedChannel::BroadcastEur,
            Currency::Usd => FeedChannel::BroadcastUsd,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Eur => write!(f, "eur"),
            Currency::Usd => write!(f, "usd"),
        }
    }
}

/// Sub-channel label on the public price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedChannel {
    #[serde(rename = "broadcastEUR")]
    BroadcastEur,
    #[serde(rename = "broadcastUSD")]
    BroadcastUsd,
}

/// Broadcast-view message: the inbound price records passed through
/// verbatim, annotated with a generation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub timestamp: DateTime<Utc>,
    pub payload: Vec<PriceRecord>,
}

/// Targeted message delivered to a single authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNotice {
    pub message: String,
}

/// Payload forwarded to the external notification service: the same records
/// projected down to `{id, symbol, price}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayUpdate {
    pub timestamp: DateTime<Utc>,
    pub payload: Vec<PriceQuote>,
}

/// Frames sent from the server to connected WebSocket clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Price update fanned out on the public feed.
    PriceUpdate {
        channel: FeedChannel,
        timestamp: DateTime<Utc>,
        payload: Vec<PriceRecord>,
    },

    /// Alert delivered on a user's authenticated channel.
    Notification { message: String },
}

impl ServerFrame {
    pub fn price_update(channel: FeedChannel, update: PriceUpdate) -> Self {
        ServerFrame::PriceUpdate {
            channel,
            timestamp: update.timestamp,
            payload: update.payload,
        }
    }

    pub fn notification(notice: UserNotice) -> Self {
        ServerFrame::Notification {
            message: notice.message,
        }
    }
}
