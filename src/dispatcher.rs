//! Webhook dispatch: match, sign, send, report.
//!
//! ```text
//! dispatcher.dispatch(event)
//!   ├─ event.to_json()                 // serialize exactly once
//!   ├─ store.find_active(event.type)   // active + subscribed only
//!   └─ for each registration (concurrent, capped by semaphore):
//!        ├─ sign_payload(body, secret) // HMAC-SHA256
//!        ├─ POST body + X-Invoica-* headers (per-call timeout)
//!        ├─ on failure: walk the retry schedule, then give up
//!        └─ DeliveryAttempt pushed into the report
//! ```
//!
//! Failures are isolated per registration: one unreachable endpoint
//! never blocks or aborts delivery to the others, and nothing here
//! propagates an error to the event producer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::config::WebhookConfig;
use crate::events::WebhookEvent;
use crate::registration::{RegistrationId, WebhookRegistration};
use crate::signing;
use crate::store::RegistrationStore;

/// Signature header: `sha256=<hex>` over the request body.
pub const SIGNATURE_HEADER: &str = "X-Invoica-Signature";

/// Event type header, e.g. `invoice.created`.
pub const EVENT_HEADER: &str = "X-Invoica-Event";

/// Stringified unix-seconds timestamp of the event.
pub const TIMESTAMP_HEADER: &str = "X-Invoica-Timestamp";

/// A pre-built webhook HTTP request ready to send.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Outcome of delivering to a single registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success { status_code: u16 },
    Failure { status_code: Option<u16>, error: String },
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success { .. })
    }
}

/// Per-registration delivery report for one dispatch call.
///
/// Exists only for the duration of that call; no attempt history is
/// retained anywhere.
#[derive(Debug, Clone)]
pub struct DeliveryAttempt {
    pub registration_id: RegistrationId,
    pub url: String,
    /// The signature sent in [`SIGNATURE_HEADER`]
    pub signature: String,
    /// Number of HTTP attempts made (1 unless a retry schedule is set)
    pub attempts: u32,
    pub outcome: DeliveryOutcome,
}

/// Outbound HTTP capability the dispatcher is constructed with.
///
/// Abstracted so tests can swap in a recording mock and hosts can
/// supply a pooled client. Returns the response status code, or an
/// error for transport-level failures (DNS, connect, timeout).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &DeliveryRequest) -> anyhow::Result<u16>;
}

/// [`HttpTransport`] backed by a reqwest client with a per-call timeout.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create webhook HTTP client");

        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &DeliveryRequest) -> anyhow::Result<u16> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.body(request.body.clone()).send().await?;
        Ok(response.status().as_u16())
    }
}

pub struct WebhookDispatcher {
    store: Arc<dyn RegistrationStore>,
    transport: Arc<dyn HttpTransport>,
    retry_schedule: Vec<Duration>,
    send_limit: Arc<Semaphore>,
}

impl WebhookDispatcher {
    /// Create a dispatcher with the default reqwest transport.
    pub fn new(store: Arc<dyn RegistrationStore>, config: &WebhookConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(config.timeout_secs)));
        Self::with_transport(store, transport, config)
    }

    /// Create a dispatcher with an injected transport.
    pub fn with_transport(
        store: Arc<dyn RegistrationStore>,
        transport: Arc<dyn HttpTransport>,
        config: &WebhookConfig,
    ) -> Self {
        Self {
            store,
            transport,
            retry_schedule: config.retry_schedule_secs.iter().map(|s| Duration::from_secs(*s)).collect(),
            send_limit: Arc::new(Semaphore::new(config.max_concurrent_sends)),
        }
    }

    /// Deliver `event` to every active registration subscribed to its
    /// type.
    ///
    /// Per-registration failures are swallowed here — logged and
    /// recorded in the returned report, which producers are free to
    /// ignore. This never returns an error: webhook delivery must not
    /// block business logic.
    pub async fn dispatch(&self, event: &WebhookEvent) -> Vec<DeliveryAttempt> {
        // Serialize exactly once. The signature must cover the same
        // bytes that go out as the request body.
        let payload = match event.to_json() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, event_type = %event.event_type, "Failed to serialize webhook event, dropping dispatch");
                return Vec::new();
            }
        };

        let registrations = match self.store.find_active(event.event_type).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, event_type = %event.event_type, "Failed to load webhook registrations, dropping dispatch");
                return Vec::new();
            }
        };

        if registrations.is_empty() {
            tracing::debug!(event_type = %event.event_type, "No active registrations for event");
            return Vec::new();
        }

        tracing::debug!(
            event_type = %event.event_type,
            count = registrations.len(),
            "Dispatching webhook event"
        );

        let deliveries = registrations.into_iter().map(|registration| {
            let payload = payload.clone();
            async move { self.deliver(registration, event, payload).await }
        });
        let attempts = futures::future::join_all(deliveries).await;

        for attempt in &attempts {
            match &attempt.outcome {
                DeliveryOutcome::Success { status_code } => {
                    tracing::debug!(
                        registration_id = %attempt.registration_id,
                        status = status_code,
                        "Webhook delivered successfully"
                    );
                }
                DeliveryOutcome::Failure { status_code, error } => {
                    tracing::warn!(
                        registration_id = %attempt.registration_id,
                        status_code = ?status_code,
                        error = %error,
                        attempts = attempt.attempts,
                        "Webhook delivery failed"
                    );
                }
            }
        }

        attempts
    }

    /// Sign and send to one registration, retrying per the schedule.
    async fn deliver(&self, registration: WebhookRegistration, event: &WebhookEvent, payload: String) -> DeliveryAttempt {
        let signature = signing::sign_payload(&payload, &registration.secret);

        let request = DeliveryRequest {
            url: registration.url.to_string(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (SIGNATURE_HEADER.to_string(), signature.clone()),
                (EVENT_HEADER.to_string(), event.event_type.to_string()),
                (TIMESTAMP_HEADER.to_string(), event.timestamp.to_string()),
            ],
            body: payload,
        };

        let mut attempts: u32 = 0;
        let mut delays = self.retry_schedule.iter();
        let outcome = loop {
            attempts += 1;

            // Hold the permit only for the HTTP call, not across
            // retry sleeps.
            let sent = {
                let _permit = self
                    .send_limit
                    .acquire()
                    .await
                    .expect("webhook send semaphore is never closed");
                self.transport.send(&request).await
            };

            let outcome = match sent {
                Ok(status) if (200..300).contains(&status) => DeliveryOutcome::Success { status_code: status },
                Ok(status) => DeliveryOutcome::Failure {
                    status_code: Some(status),
                    error: format!("HTTP {}", status),
                },
                Err(e) => DeliveryOutcome::Failure {
                    status_code: None,
                    error: e.to_string(),
                },
            };

            if outcome.is_success() {
                break outcome;
            }

            match delays.next() {
                Some(delay) => {
                    tracing::debug!(
                        registration_id = %registration.id,
                        attempt = attempts,
                        delay_secs = delay.as_secs(),
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
                None => break outcome,
            }
        };

        DeliveryAttempt {
            registration_id: registration.id,
            url: request.url,
            signature,
            attempts,
            outcome,
        }
    }
}
