//! Realtime notification feed configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-process insert bus and per-session feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffer size for the broadcast channels carrying inserted records.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Number of records fetched when a session syncs its feed.
    #[serde(default = "default_sync_limit")]
    pub sync_limit: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            sync_limit: default_sync_limit(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_sync_limit() -> u64 {
    50
}
