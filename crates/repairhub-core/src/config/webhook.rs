//! External webhook channel configuration.

use serde::{Deserialize, Serialize};

/// Outbound webhook (Discord-compatible) endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook endpoint URL. When unset, external dispatch is a no-op.
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds for a single delivery attempt.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
