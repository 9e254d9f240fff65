use serde::{Deserialize, Serialize};

/// Webhook delivery configuration.
///
/// Host applications embed this in their own config tree and load it
/// however they load the rest (env, yaml, figment layers).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    /// HTTP timeout for webhook deliveries in seconds (default: 30)
    pub timeout_secs: u64,
    /// Maximum concurrent outbound HTTP requests (default: 20)
    pub max_concurrent_sends: usize,
    /// Retry backoff schedule in seconds. Each entry is the delay
    /// before the next attempt, so the maximum number of attempts is
    /// one more than the schedule length. An empty schedule means a
    /// single attempt (default).
    pub retry_schedule_secs: Vec<u64>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrent_sends: 20,
            retry_schedule_secs: Vec::new(),
        }
    }
}
