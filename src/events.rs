//! Webhook event taxonomy and payload types.

use serde::{Deserialize, Serialize};

/// Webhook event types for invoice and settlement lifecycles.
///
/// This is a closed set: registrations subscribing to anything else are
/// rejected at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    /// An invoice was created
    #[serde(rename = "invoice.created")]
    InvoiceCreated,
    /// An invoice was updated
    #[serde(rename = "invoice.updated")]
    InvoiceUpdated,
    /// An invoice was paid in full
    #[serde(rename = "invoice.paid")]
    InvoicePaid,
    /// A settlement was created
    #[serde(rename = "settlement.created")]
    SettlementCreated,
    /// A settlement was confirmed on-chain
    #[serde(rename = "settlement.confirmed")]
    SettlementConfirmed,
}

impl WebhookEventType {
    /// All known event types, in subscription-list order.
    pub const ALL: [WebhookEventType; 5] = [
        Self::InvoiceCreated,
        Self::InvoiceUpdated,
        Self::InvoicePaid,
        Self::SettlementCreated,
        Self::SettlementConfirmed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvoiceCreated => "invoice.created",
            Self::InvoiceUpdated => "invoice.updated",
            Self::InvoicePaid => "invoice.paid",
            Self::SettlementCreated => "settlement.created",
            Self::SettlementConfirmed => "settlement.confirmed",
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WebhookEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice.created" => Ok(Self::InvoiceCreated),
            "invoice.updated" => Ok(Self::InvoiceUpdated),
            "invoice.paid" => Ok(Self::InvoicePaid),
            "settlement.created" => Ok(Self::SettlementCreated),
            "settlement.confirmed" => Ok(Self::SettlementConfirmed),
            _ => Err(format!(
                "Unknown event type: {}. Valid types are: invoice.created, invoice.updated, \
                 invoice.paid, settlement.created, settlement.confirmed",
                s
            )),
        }
    }
}

/// Complete webhook event payload.
///
/// Immutable once constructed; the dispatcher borrows it for the
/// duration of one dispatch call. The `data` mapping is owned by the
/// producing workflow and opaque to this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event type (e.g., "invoice.created")
    #[serde(rename = "type")]
    pub event_type: WebhookEventType,
    /// Unix epoch seconds at which the event was generated
    pub timestamp: i64,
    /// Event-specific data
    pub data: serde_json::Value,
}

impl WebhookEvent {
    /// Create a new event stamped with the current time.
    pub fn new(event_type: WebhookEventType, data: serde_json::Value) -> Self {
        Self {
            event_type,
            timestamp: chrono::Utc::now().timestamp(),
            data,
        }
    }

    /// Serialize to the canonical JSON string used both as the request
    /// body and as the HMAC signing input.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_from_str() {
        assert_eq!(
            "invoice.created".parse::<WebhookEventType>().unwrap(),
            WebhookEventType::InvoiceCreated
        );
        assert_eq!(
            "settlement.confirmed".parse::<WebhookEventType>().unwrap(),
            WebhookEventType::SettlementConfirmed
        );
        assert!("invalid.event".parse::<WebhookEventType>().is_err());
    }

    #[test]
    fn test_event_type_round_trips_through_display() {
        for event_type in WebhookEventType::ALL {
            assert_eq!(
                event_type.to_string().parse::<WebhookEventType>().unwrap(),
                event_type
            );
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = WebhookEvent {
            event_type: WebhookEventType::InvoicePaid,
            timestamp: 1704067200,
            data: json!({"id": "inv_123", "amount": 4200}),
        };

        let json = event.to_json().unwrap();
        assert!(json.contains(r#""type":"invoice.paid""#));
        assert!(json.contains(r#""timestamp":1704067200"#));
        assert!(json.contains("inv_123"));

        let parsed: WebhookEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type, WebhookEventType::InvoicePaid);
        assert_eq!(parsed.timestamp, 1704067200);
        assert_eq!(parsed.data["amount"], 4200);
    }

    #[test]
    fn test_new_stamps_current_time() {
        let before = chrono::Utc::now().timestamp();
        let event = WebhookEvent::new(WebhookEventType::InvoiceCreated, json!({}));
        let after = chrono::Utc::now().timestamp();
        assert!(event.timestamp >= before && event.timestamp <= after);
    }
}
