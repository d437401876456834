//! Root configuration types.

use super::defaults::default_port;
use super::game::GameConfig;
use super::logging::LoggingConfig;
use super::protocol::ProtocolConfig;
use super::rate_limit::RateLimitConfig;
use super::security::SecurityConfig;
use super::signaling::SignalingConfig;
use super::websocket::WebSocketConfig;
use serde::{Deserialize, Serialize};

/// Root configuration struct for the arena server.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub signaling: SignalingConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            game: GameConfig::default(),
            protocol: ProtocolConfig::default(),
            signaling: SignalingConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
            security: SecurityConfig::default(),
            websocket: WebSocketConfig::default(),
        }
    }
}
