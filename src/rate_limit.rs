use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use crate::protocol::PlayerId;

/// Runtime join rate limit settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Length of one counting window
    pub time_window: Duration,
    /// Join attempts allowed per connection per window
    pub max_join_attempts: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            time_window: Duration::from_secs(60),
            max_join_attempts: 20,
        }
    }
}

impl From<&crate::config::RateLimitConfig> for RateLimitConfig {
    fn from(config: &crate::config::RateLimitConfig) -> Self {
        Self {
            time_window: Duration::from_secs(config.time_window),
            max_join_attempts: config.max_join_attempts,
        }
    }
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    join_attempts: u32,
    window_start: Instant,
}

impl RateLimitEntry {
    fn new() -> Self {
        Self {
            join_attempts: 0,
            window_start: Instant::now(),
        }
    }

    fn maybe_reset_window(&mut self, config: &RateLimitConfig) {
        if self.window_start.elapsed() >= config.time_window {
            self.join_attempts = 0;
            self.window_start = Instant::now();
        }
    }

    fn try_join_attempt(&mut self, config: &RateLimitConfig) -> bool {
        self.maybe_reset_window(config);
        if self.join_attempts < config.max_join_attempts {
            self.join_attempts += 1;
            true
        } else {
            false
        }
    }

    fn time_until_reset(&self, config: &RateLimitConfig) -> Duration {
        config.time_window.saturating_sub(self.window_start.elapsed())
    }
}

/// Fixed-window limiter for `joinRoom` attempts, one window per connection.
#[derive(Debug)]
pub struct JoinRateLimiter {
    config: RateLimitConfig,
    entries: DashMap<PlayerId, RateLimitEntry>,
}

impl JoinRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    /// Count an attempt; fails once the window's allowance is spent.
    pub fn check_join_attempt(&self, player_id: &PlayerId) -> Result<(), RateLimitError> {
        let mut entry = self
            .entries
            .entry(*player_id)
            .or_insert_with(RateLimitEntry::new);

        if entry.try_join_attempt(&self.config) {
            Ok(())
        } else {
            Err(RateLimitError::JoinLimitExceeded {
                retry_after: entry.time_until_reset(&self.config),
            })
        }
    }

    /// Drop the connection's window on disconnect.
    pub fn forget(&self, player_id: &PlayerId) {
        self.entries.remove(player_id);
    }

    pub fn tracked_connections(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Join attempt rate limit exceeded. Try again in {} seconds.", retry_after.as_secs())]
    JoinLimitExceeded { retry_after: Duration },
}

impl RateLimitError {
    pub const fn retry_after(&self) -> Duration {
        match self {
            Self::JoinLimitExceeded { retry_after } => *retry_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn limiter(max: u32, window: Duration) -> JoinRateLimiter {
        JoinRateLimiter::new(RateLimitConfig {
            time_window: window,
            max_join_attempts: max,
        })
    }

    #[tokio::test]
    async fn allows_up_to_limit() {
        let limiter = limiter(3, Duration::from_secs(60));
        let id = Uuid::new_v4();
        for _ in 0..3 {
            assert!(limiter.check_join_attempt(&id).is_ok());
        }
        let err = limiter.check_join_attempt(&id).unwrap_err();
        assert!(err.retry_after() <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn connections_are_independent() {
        let limiter = limiter(1, Duration::from_secs(60));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(limiter.check_join_attempt(&a).is_ok());
        assert!(limiter.check_join_attempt(&a).is_err());
        assert!(limiter.check_join_attempt(&b).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets() {
        let limiter = limiter(1, Duration::from_secs(10));
        let id = Uuid::new_v4();
        assert!(limiter.check_join_attempt(&id).is_ok());
        assert!(limiter.check_join_attempt(&id).is_err());
        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(limiter.check_join_attempt(&id).is_ok());
    }

    #[tokio::test]
    async fn forget_clears_state() {
        let limiter = limiter(1, Duration::from_secs(60));
        let id = Uuid::new_v4();
        limiter.check_join_attempt(&id).unwrap();
        limiter.forget(&id);
        assert_eq!(limiter.tracked_connections(), 0);
        assert!(limiter.check_join_attempt(&id).is_ok());
    }
}
