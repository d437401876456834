//! Default value functions for configuration fields.
//!
//! Used by serde's `#[serde(default = ...)]` attributes throughout the
//! configuration system, grouped by section.

use super::logging::LogFormat;
use crate::protocol::{
    DEFAULT_MAX_PLAYERS_PER_ROOM, DEFAULT_MAX_PLAYER_NAME_LENGTH, DEFAULT_MAX_ROOM_ID_LENGTH,
};

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    3000
}

// =============================================================================
// Game Defaults
// =============================================================================

pub const fn default_max_players_per_room() -> usize {
    DEFAULT_MAX_PLAYERS_PER_ROOM
}

pub const fn default_initial_guns_min() -> u32 {
    1
}

pub const fn default_initial_guns_max() -> u32 {
    3
}

pub const fn default_initial_ammo_min() -> u32 {
    5
}

pub const fn default_initial_ammo_max() -> u32 {
    14
}

pub const fn default_spawn_width() -> f64 {
    800.0
}

pub const fn default_spawn_height() -> f64 {
    600.0
}

pub const fn default_steal_gun_cap() -> u32 {
    1
}

pub const fn default_steal_ammo_cap() -> u32 {
    3
}

pub const fn default_attack_ammo_cost() -> u32 {
    1
}

pub const fn default_attack_requires_same_room() -> bool {
    false
}

// =============================================================================
// Signaling Defaults
// =============================================================================

pub const fn default_enforce_room_membership() -> bool {
    true
}

// =============================================================================
// Rate Limit Defaults
// =============================================================================

pub const fn default_rate_limit_time_window() -> u64 {
    60
}

pub const fn default_max_join_attempts() -> u32 {
    20
}

// =============================================================================
// Protocol Defaults
// =============================================================================

pub const fn default_max_player_name_length() -> usize {
    DEFAULT_MAX_PLAYER_NAME_LENGTH
}

pub const fn default_max_room_id_length() -> usize {
    DEFAULT_MAX_ROOM_ID_LENGTH
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "steal-arena.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub const fn default_require_metrics_auth() -> bool {
    false
}

pub const fn default_max_message_size() -> usize {
    65536 // 64KB
}

pub const fn default_max_connections_per_ip() -> usize {
    32
}

// =============================================================================
// WebSocket Defaults
// =============================================================================

pub const fn default_outbound_queue_capacity() -> usize {
    64
}
