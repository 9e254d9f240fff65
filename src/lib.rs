//! Webhook notification subsystem for the Invoica platform.
//!
//! - [`events`]: Event taxonomy and payload types
//! - [`signing`]: HMAC-SHA256 signature generation and verification
//! - [`registration`]: Endpoint registrations and their validation
//! - [`store`]: Registration lookup capability and in-memory backing
//! - [`dispatcher`]: Match/sign/send/report loop for outbound delivery
//! - [`verifier`]: Receiver-side authenticate-then-parse counterpart
//!
//! A producer constructs a [`WebhookEvent`] and hands it to
//! [`WebhookDispatcher::dispatch`]; the dispatcher serializes it once,
//! signs that exact string per matching registration, and POSTs it with
//! the `X-Invoica-*` headers. The receiver calls
//! [`verifier::construct_event`] with the shared secret to authenticate
//! and parse the payload.

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod registration;
pub mod signing;
pub mod store;
pub mod verifier;

pub use config::WebhookConfig;
pub use dispatcher::{DeliveryAttempt, DeliveryOutcome, DeliveryRequest, HttpTransport, ReqwestTransport, WebhookDispatcher};
pub use errors::{Error, Result};
pub use events::{WebhookEvent, WebhookEventType};
pub use registration::{WebhookRegistration, WebhookRegistrationRequest};
pub use signing::{generate_secret, sign_payload, verify_signature};
pub use store::{InMemoryRegistrationStore, RegistrationStore};
pub use verifier::construct_event;
