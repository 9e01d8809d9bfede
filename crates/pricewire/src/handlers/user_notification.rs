//! Handler for per-user alert notification events.

use std::sync::Arc;

use async_trait::async_trait;
use pricewire_protocol::{AlertDirection, Event, EventKind, NotificationIntent, UserNotice};

use crate::dispatch::EventHandler;
use crate::realtime::Delivery;

/// Delivers an alert to the targeted user's authenticated channel.
pub struct UserNotificationHandler {
    delivery: Arc<dyn Delivery>,
}

impl UserNotificationHandler {
    pub fn new(delivery: Arc<dyn Delivery>) -> Self {
        Self { delivery }
    }
}

#[async_trait]
impl EventHandler for UserNotificationHandler {
    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::UserNotification]
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let Event::UserNotification(intent) = event else {
            return Ok(());
        };

        let message = intent
            .message
            .clone()
            .unwrap_or_else(|| alert_text(intent));

        self.delivery
            .send_to_user(&intent.user_id, UserNotice { message })
            .await?;

        Ok(())
    }
}

/// Synthesize the alert text from the intent's price fields.
fn alert_text(intent: &NotificationIntent) -> String {
    let verb = match intent.alert_type {
        Some(AlertDirection::Above) => "surpassed",
        _ => "dropped below",
    };
    format!(
        "{} price {} your target of ${}. Current price is ${}.",
        intent.crypto_id.as_deref().unwrap_or("unknown"),
        verb,
        intent.alert_price.as_deref().unwrap_or("?"),
        intent.current_price.as_deref().unwrap_or("?"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::DeliveryError;
    use pricewire_protocol::{FeedChannel, PriceUpdate};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDelivery {
        broadcasts: Mutex<Vec<(FeedChannel, PriceUpdate)>>,
        notices: Mutex<Vec<(String, UserNotice)>>,
    }

    #[async_trait]
    impl Delivery for RecordingDelivery {
        async fn broadcast(
            &self,
            channel: FeedChannel,
            update: PriceUpdate,
        ) -> Result<(), DeliveryError> {
            self.broadcasts.lock().unwrap().push((channel, update));
            Ok(())
        }

        async fn send_to_user(
            &self,
            user_id: &str,
            notice: UserNotice,
        ) -> Result<(), DeliveryError> {
            self.notices
                .lock()
                .unwrap()
                .push((user_id.to_string(), notice));
            Ok(())
        }
    }

    fn intent() -> NotificationIntent {
        NotificationIntent {
            user_id: "user123".to_string(),
            crypto_id: Some("bitcoin".to_string()),
            alert_price: Some("40000".to_string()),
            current_price: Some("41000".to_string()),
            alert_type: Some(AlertDirection::Above),
            message: None,
        }
    }

    #[tokio::test]
    async fn test_above_alert_synthesizes_surpassed_text() {
        let delivery = Arc::new(RecordingDelivery::default());
        let handler = UserNotificationHandler::new(delivery.clone());

        handler
            .handle(&Event::UserNotification(intent()))
            .await
            .unwrap();

        let notices = delivery.notices.lock().unwrap();
        let (user_id, notice) = &notices[0];
        assert_eq!(user_id, "user123");
        assert_eq!(
            notice.message,
            "bitcoin price surpassed your target of $40000. Current price is $41000."
        );
        assert!(delivery.broadcasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_below_alert_synthesizes_dropped_text() {
        let delivery = Arc::new(RecordingDelivery::default());
        let handler = UserNotificationHandler::new(delivery.clone());

        let mut below = intent();
        below.alert_type = Some(AlertDirection::Below);
        below.alert_price = Some("30000".to_string());
        below.current_price = Some("29500".to_string());

        handler
            .handle(&Event::UserNotification(below))
            .await
            .unwrap();

        let notices = delivery.notices.lock().unwrap();
        assert_eq!(
            notices[0].1.message,
            "bitcoin price dropped below your target of $30000. Current price is $29500."
        );
    }

    #[tokio::test]
    async fn test_explicit_message_is_delivered_unchanged() {
        let delivery = Arc::new(RecordingDelivery::default());
        let handler = UserNotificationHandler::new(delivery.clone());

        let mut with_message = intent();
        with_message.message = Some("custom wording, delivered as-is".to_string());

        handler
            .handle(&Event::UserNotification(with_message))
            .await
            .unwrap();

        let notices = delivery.notices.lock().unwrap();
        assert_eq!(notices[0].1.message, "custom wording, delivered as-is");
    }
}
