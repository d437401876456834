//! Rate limiting configuration types.

use super::defaults::{default_max_join_attempts, default_rate_limit_time_window};
use serde::{Deserialize, Serialize};

/// Rate limiting configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Time window for rate limiting (seconds)
    #[serde(default = "default_rate_limit_time_window")]
    pub time_window: u64,
    /// Maximum number of join attempts per connection per time window
    #[serde(default = "default_max_join_attempts")]
    pub max_join_attempts: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            time_window: default_rate_limit_time_window(),
            max_join_attempts: default_max_join_attempts(),
        }
    }
}
