//! Configuration module for the arena server.
//!
//! Configuration is layered from JSON documents (inline env, stdin, files),
//! per-field environment overrides and compiled defaults.
//!
//! # Module Structure
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`game`]: Room capacity, starting inventory and combat numbers
//! - [`protocol`]: Input length limits
//! - [`signaling`]: Voice relay authorization
//! - [`rate_limit`]: Join attempt limits
//! - [`security`]: CORS, message size, per-IP limits, metrics auth
//! - [`websocket`]: Per-connection queue settings
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions

pub mod defaults;
pub mod game;
pub mod loader;
pub mod logging;
pub mod protocol;
pub mod rate_limit;
pub mod security;
pub mod signaling;
pub mod types;
pub mod validation;
pub mod websocket;

pub use game::GameConfig;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use protocol::ProtocolConfig;

pub use rate_limit::RateLimitConfig;

pub use security::SecurityConfig;

pub use signaling::SignalingConfig;

pub use types::Config;

pub use validation::{is_production_mode, validate_config};

pub use websocket::WebSocketConfig;
