//! Receiver-side verification: authenticate, then parse.
//!
//! The counterpart to the dispatcher, used by a webhook receiver
//! holding the shared secret.

use crate::errors::{Error, Result};
use crate::events::WebhookEvent;
use crate::signing;

/// Verify an inbound payload against its signature header and
/// deserialize it into a typed event.
///
/// Verification happens strictly before parsing: untrusted bytes are
/// never interpreted as JSON until they have been authenticated. A bad
/// signature yields [`Error::Verification`] (map to 401); a payload
/// that authenticates but is not a well-formed event yields
/// [`Error::Payload`] (map to 400).
pub fn construct_event(raw_payload: &str, signature_header: &str, secret: &str) -> Result<WebhookEvent> {
    if !signing::verify_signature(raw_payload, secret, signature_header) {
        return Err(Error::Verification);
    }

    let event = serde_json::from_str(raw_payload)?;
    Ok(event)
}
