//! Protocol configuration: input length limits.

use super::defaults::{default_max_player_name_length, default_max_room_id_length};
use serde::{Deserialize, Serialize};

/// Protocol configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Maximum length for player names, in characters
    #[serde(default = "default_max_player_name_length")]
    pub max_player_name_length: usize,
    /// Maximum length for room ids, in characters
    #[serde(default = "default_max_room_id_length")]
    pub max_room_id_length: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_player_name_length: default_max_player_name_length(),
            max_room_id_length: default_max_room_id_length(),
        }
    }
}
