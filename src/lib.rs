#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! # Steal Arena Server
//!
//! An in-memory WebSocket coordinator for small multiplayer rooms: players
//! join a named room, steal from and attack each other, move around, and
//! exchange WebRTC voice handshakes through the server.

/// Steal, attack and move resolution
pub mod combat;

/// Server configuration and environment variables
pub mod config;

/// Outbound delivery to connected clients
pub mod coordination;

/// Per-event error taxonomy
pub mod error;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// WebSocket message protocol definitions
pub mod protocol;

/// Join rate limiting
pub mod rate_limit;

/// Player records, room membership and per-room locks
pub mod registry;

/// Session coordination
pub mod server;

/// WebSocket connection handling
pub mod websocket;
