//! HMAC-SHA256 signing for webhook deliveries.
//!
//! The signature is computed over the exact serialized event string
//! that is sent as the request body, and carried in the
//! `X-Invoica-Signature` header as `sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix for generated webhook secrets
pub const SECRET_PREFIX: &str = "whsec_";

/// Prefix for webhook signatures
pub const SIGNATURE_PREFIX: &str = "sha256=";

const SECRET_RANDOM_BYTES: usize = 24;

/// Generate a new webhook secret.
///
/// Returns a `whsec_` prefixed hex-encoded 24-byte random secret
/// (54 characters total).
pub fn generate_secret() -> String {
    use rand::RngCore;

    let mut secret_bytes = [0u8; SECRET_RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut secret_bytes);

    format!("{}{}", SECRET_PREFIX, hex::encode(secret_bytes))
}

/// Sign a webhook payload.
///
/// The secret string is used directly as the HMAC key, whether it is a
/// generated `whsec_` secret or a caller-supplied one.
///
/// # Returns
///
/// The signature in format `sha256={hex-hmac-sha256}` (71 characters).
/// Deterministic: the same inputs always yield the same signature.
pub fn sign_payload(payload: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}

/// Verify a webhook signature against a payload.
///
/// Recomputes the expected signature and compares in constant time.
/// The length check up front is a fast path, not a side channel:
/// signature length does not depend on the secret.
pub fn verify_signature(payload: &str, secret: &str, signature: &str) -> bool {
    let expected = sign_payload(payload, secret);

    if signature.len() != expected.len() {
        return false;
    }

    constant_time_eq(signature.as_bytes(), expected.as_bytes())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
