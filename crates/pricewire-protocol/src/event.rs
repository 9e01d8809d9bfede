//! Inbound event envelope and payload types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Discriminator selecting which handlers process an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CryptoUpdateEur,
    CryptoUpdateUsd,
    UserNotification,
}

impl EventKind {
    /// All known kinds, in routing-table order.
    pub const ALL: [EventKind; 3] = [
        EventKind::CryptoUpdateEur,
        EventKind::CryptoUpdateUsd,
        EventKind::UserNotification,
    ];

    /// Number of known kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index into the dispatcher's routing table.
    pub fn index(self) -> usize {
        match self {
            EventKind::CryptoUpdateEur => 0,
            EventKind::CryptoUpdateUsd => 1,
            EventKind::UserNotification => 2,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::CryptoUpdateEur => write!(f, "crypto_update_eur"),
            EventKind::CryptoUpdateUsd => write!(f, "crypto_update_usd"),
            EventKind::UserNotification => write!(f, "user_notification"),
        }
    }
}

/// A single market price record.
///
/// The typed fields are the ones the relay projection needs; everything else
/// the upstream feed attaches (market cap, 24h change, ...) is preserved via
/// the flattened map so broadcasts pass the records through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: String,
    pub symbol: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Projection of a [`PriceRecord`] forwarded to the notification relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub id: String,
    pub symbol: String,
    pub price: f64,
}

impl From<&PriceRecord> for PriceQuote {
    fn from(record: &PriceRecord) -> Self {
        Self {
            id: record.id.clone(),
            symbol: record.symbol.clone(),
            price: record.price,
        }
    }
}

/// Direction of a user price alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertDirection {
    #[serde(rename = "ABOVE")]
    Above,
    #[serde(rename = "BELOW")]
    Below,
}

/// Intent to notify a single user, as submitted by the alerting pipeline.
///
/// Either `message` is supplied verbatim, or the alert fields are present and
/// the delivery text is synthesized from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIntent {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<AlertDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Immutable typed event envelope.
///
/// The payload shape is fixed by the kind, so the envelope is a tagged union
/// checked exhaustively at the dispatch boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Event {
    CryptoUpdateEur(Vec<PriceRecord>),
    CryptoUpdateUsd(Vec<PriceRecord>),
    UserNotification(NotificationIntent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::CryptoUpdateEur(_) => EventKind::CryptoUpdateEur,
            Event::CryptoUpdateUsd(_) => EventKind::CryptoUpdateUsd,
            Event::UserNotification(_) => EventKind::UserNotification,
        }
    }

    /// Parse an event envelope from raw JSON.
    ///
    /// An unknown kind or a payload that does not match the kind's shape is
    /// rejected here, before any dispatch is attempted.
    pub fn from_value(value: Value) -> Result<Self, InvalidEventError> {
        serde_json::from_value(value).map_err(|err| InvalidEventError::Malformed(err.to_string()))
    }

    /// Validate the payload beyond what deserialization enforces.
    ///
    /// Price-update payloads must carry at least one record.
    pub fn validate(&self) -> Result<(), InvalidEventError> {
        match self {
            Event::CryptoUpdateEur(records) | Event::CryptoUpdateUsd(records) => {
                if records.is_empty() {
                    return Err(InvalidEventError::EmptyPayload { kind: self.kind() });
                }
            }
            Event::UserNotification(_) => {}
        }
        Ok(())
    }
}

/// A submitted event envelope that cannot be dispatched.
#[derive(Debug, Error)]
pub enum InvalidEventError {
    #[error("malformed event envelope: {0}")]
    Malformed(String),

    #[error("event kind '{kind}' carries an empty payload sequence")]
    EmptyPayload { kind: EventKind },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_records() -> Value {
        json!([
            {"id": "bitcoin", "symbol": "btc", "price": 102809.0},
            {"id": "ethereum", "symbol": "eth", "price": 3187.37}
        ])
    }

    #[test]
    fn test_parse_crypto_update_envelope() {
        let event = Event::from_value(json!({
            "kind": "crypto_update_eur",
            "payload": sample_records(),
        }))
        .unwrap();

        assert_eq!(event.kind(), EventKind::CryptoUpdateEur);
        let Event::CryptoUpdateEur(records) = event else {
            panic!("wrong variant");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "bitcoin");
        assert_eq!(records[1].price, 3187.37);
    }

    #[test]
    fn test_parse_user_notification_envelope() {
        let event = Event::from_value(json!({
            "kind": "user_notification",
            "payload": {
                "userId": "user123",
                "cryptoId": "bitcoin",
                "alertPrice": "40000",
                "currentPrice": "41000",
                "alertType": "ABOVE"
            },
        }))
        .unwrap();

        let Event::UserNotification(intent) = event else {
            panic!("wrong variant");
        };
        assert_eq!(intent.user_id, "user123");
        assert_eq!(intent.alert_type, Some(AlertDirection::Above));
        assert!(intent.message.is_none());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = Event::from_value(json!({
            "kind": "weather_update",
            "payload": [],
        }))
        .unwrap_err();
        assert!(matches!(err, InvalidEventError::Malformed(_)));
    }

    #[test]
    fn test_payload_shape_mismatch_is_rejected() {
        // Price records where a notification intent is expected.
        let err = Event::from_value(json!({
            "kind": "user_notification",
            "payload": sample_records(),
        }))
        .unwrap_err();
        assert!(matches!(err, InvalidEventError::Malformed(_)));
    }

    #[test]
    fn test_empty_price_payload_fails_validation() {
        let event = Event::from_value(json!({
            "kind": "crypto_update_usd",
            "payload": [],
        }))
        .unwrap();
        let err = event.validate().unwrap_err();
        assert!(matches!(
            err,
            InvalidEventError::EmptyPayload {
                kind: EventKind::CryptoUpdateUsd
            }
        ));
    }

    #[test]
    fn test_extra_record_fields_round_trip() {
        let input = json!({
            "id": "bitcoin",
            "symbol": "btc",
            "price": 102809.0,
            "market_cap": 2030000000000i64,
            "price_change_24h": -1.2
        });
        let record: PriceRecord = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(record.extra.len(), 2);

        let output = serde_json::to_value(&record).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_price_quote_projection() {
        let record: PriceRecord = serde_json::from_value(json!({
            "id": "ethereum",
            "symbol": "eth",
            "price": 3187.37,
            "market_cap": 380000000000i64
        }))
        .unwrap();

        let quote = PriceQuote::from(&record);
        assert_eq!(
            serde_json::to_value(&quote).unwrap(),
            json!({"id": "ethereum", "symbol": "eth", "price": 3187.37})
        );
    }

    #[test]
    fn test_kind_index_is_dense() {
        for (position, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }
}
