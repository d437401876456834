//! Voice signaling relay configuration.

use super::defaults::default_enforce_room_membership;
use serde::{Deserialize, Serialize};

/// Signaling relay configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SignalingConfig {
    /// Only relay when sender and recipient are both members of the named room.
    /// Disabling this forwards to any connected id.
    #[serde(default = "default_enforce_room_membership")]
    pub enforce_room_membership: bool,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            enforce_room_membership: default_enforce_room_membership(),
        }
    }
}
