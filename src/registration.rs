//! Webhook endpoint registrations and their validation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::events::WebhookEventType;
use crate::signing;

/// Registration ID type alias for type safety.
pub type RegistrationId = Uuid;

/// Minimum length for a caller-supplied secret.
pub const SECRET_MIN_LEN: usize = 16;

/// Maximum length for a caller-supplied secret.
pub const SECRET_MAX_LEN: usize = 64;

/// A registered webhook endpoint: where to deliver, which events, and
/// the shared secret deliveries are signed with.
///
/// Serializes in the camelCase shape the registration CRUD layer
/// exposes (`createdAt` etc.). The secret is included — responses that
/// must not leak it are the CRUD layer's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegistration {
    pub id: RegistrationId,
    pub url: Url,
    pub events: BTreeSet<WebhookEventType>,
    pub secret: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl WebhookRegistration {
    /// Check if this registration should receive the given event type.
    pub fn accepts_event(&self, event_type: WebhookEventType) -> bool {
        self.active && self.events.contains(&event_type)
    }
}

/// Input shape consumed from the registration CRUD layer.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRegistrationRequest {
    pub url: String,
    pub events: Vec<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

impl WebhookRegistrationRequest {
    /// Validate and turn this request into an active registration.
    ///
    /// Rejects non-HTTPS or malformed URLs, empty or unknown event
    /// subscriptions, and caller secrets outside 16–64 characters. When
    /// no secret is supplied a `whsec_` one is generated.
    pub fn into_registration(self) -> Result<WebhookRegistration> {
        let url = Url::parse(&self.url).map_err(|e| Error::validation(format!("invalid webhook URL: {}", e)))?;
        if url.scheme() != "https" {
            return Err(Error::validation("webhook URL must use HTTPS"));
        }

        if self.events.is_empty() {
            return Err(Error::validation("at least one event type is required"));
        }
        let mut events = BTreeSet::new();
        for raw in &self.events {
            let event_type = raw.parse::<WebhookEventType>().map_err(Error::validation)?;
            events.insert(event_type);
        }

        let secret = match self.secret {
            Some(secret) => {
                if secret.len() < SECRET_MIN_LEN || secret.len() > SECRET_MAX_LEN {
                    return Err(Error::validation(format!(
                        "secret must be between {} and {} characters",
                        SECRET_MIN_LEN, SECRET_MAX_LEN
                    )));
                }
                secret
            }
            None => signing::generate_secret(),
        };

        Ok(WebhookRegistration {
            id: Uuid::new_v4(),
            url,
            events,
            secret,
            active: true,
            created_at: Utc::now(),
        })
    }
}
