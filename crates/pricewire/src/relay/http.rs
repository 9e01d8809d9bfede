//! HTTP implementation of the notification relay.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use pricewire_protocol::{Currency, RelayUpdate};

use super::{NotificationRelay, RelayError};

/// Forwards relay updates to the notification service over HTTP.
pub struct HttpNotificationRelay {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotificationRelay {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NotificationRelay for HttpNotificationRelay {
    async fn send_notification(
        &self,
        currency: Currency,
        update: &RelayUpdate,
    ) -> Result<(), RelayError> {
        let url = format!("{}/notifications/{}", self.base_url, currency);
        let response = self.client.post(&url).json(update).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status { status });
        }

        debug!(
            "relayed {} {} quote(s) to the notification service",
            update.payload.len(),
            currency
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_normalized() {
        let relay =
            HttpNotificationRelay::new("http://localhost:3001/", Duration::from_secs(5)).unwrap();
        assert_eq!(relay.base_url, "http://localhost:3001");
    }
}
