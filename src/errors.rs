use thiserror::Error as ThisError;

/// Errors raised by the webhook subsystem.
///
/// Each variant tags one failure class so callers can branch on kind
/// instead of downcasting. An HTTP layer wrapping this crate should map
/// variants through [`Error::status_code`]: signature failures get an
/// authentication-specific response (401), malformed payloads a 400.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid registration data: malformed URL, unknown event types,
    /// or out-of-bounds secret length
    #[error("{message}")]
    Validation { message: String },

    /// Inbound payload failed signature verification
    #[error("webhook signature verification failed")]
    Verification,

    /// A delivery attempt failed (non-2xx response or transport error)
    #[error("webhook delivery failed: {message}")]
    Delivery {
        status_code: Option<u16>,
        message: String,
    },

    /// Payload failed to parse as JSON (only reachable after the
    /// signature has been verified)
    #[error("invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Suggested HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::Verification => 401,
            Error::Delivery { .. } => 502,
            Error::Payload(_) => 400,
            Error::Other(_) => 500,
        }
    }
}

/// Type alias for webhook operation results
pub type Result<T> = std::result::Result<T, Error>;
