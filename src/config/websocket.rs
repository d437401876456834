//! WebSocket configuration types.

use super::defaults::default_outbound_queue_capacity;
use serde::{Deserialize, Serialize};

/// WebSocket configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct WebSocketConfig {
    /// Frames buffered per connection before new ones are dropped
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_queue_capacity(),
        }
    }
}

impl WebSocketConfig {
    /// Validate WebSocket configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.outbound_queue_capacity == 0 {
            anyhow::bail!("websocket.outbound_queue_capacity must be at least 1");
        }
        Ok(())
    }
}
