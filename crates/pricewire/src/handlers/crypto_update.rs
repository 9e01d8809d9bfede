//! Handler for market price update events.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use pricewire_protocol::{Currency, Event, EventKind, PriceQuote, PriceUpdate, RelayUpdate};

use crate::dispatch::EventHandler;
use crate::realtime::Delivery;
use crate::relay::NotificationRelay;

/// Fans a price update out on the currency's public sub-channel and forwards
/// the projected records to the notification relay.
pub struct CryptoUpdateHandler {
    delivery: Arc<dyn Delivery>,
    relay: Arc<dyn NotificationRelay>,
}

impl CryptoUpdateHandler {
    pub fn new(delivery: Arc<dyn Delivery>, relay: Arc<dyn NotificationRelay>) -> Self {
        Self { delivery, relay }
    }
}

#[async_trait]
impl EventHandler for CryptoUpdateHandler {
    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::CryptoUpdateEur, EventKind::CryptoUpdateUsd]
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let (currency, records) = match event {
            Event::CryptoUpdateEur(records) => (Currency::Eur, records),
            Event::CryptoUpdateUsd(records) => (Currency::Usd, records),
            Event::UserNotification(_) => return Ok(()),
        };

        let timestamp = Utc::now();

        // Broadcast view: the inbound records verbatim, stamped once.
        let update = PriceUpdate {
            timestamp,
            payload: records.clone(),
        };
        self.delivery
            .broadcast(currency.feed_channel(), update)
            .await?;

        // Relay view: the same records projected down. Forwarded off the
        // dispatch path; a relay failure must never fail the broadcast.
        let relay_update = RelayUpdate {
            timestamp,
            payload: records.iter().map(PriceQuote::from).collect(),
        };
        let relay = self.relay.clone();
        tokio::spawn(async move {
            if let Err(err) = relay.send_notification(currency, &relay_update).await {
                warn!("notification relay delivery failed for {currency}: {err}");
            }
        });

        Ok(())
    }
}
