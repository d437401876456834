use crate::config::ProtocolConfig;

use super::types::RoomId;

/// Normalize a client-chosen room token: trim and upper-case.
///
/// Room ids are arbitrary tokens; only emptiness, length and control
/// characters are rejected.
pub fn normalize_room_id_with_config(raw: &str, config: &ProtocolConfig) -> Result<RoomId, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Please enter a room ID".to_string());
    }
    if trimmed.chars().count() > config.max_room_id_length {
        return Err(format!(
            "Room ID too long (max {} characters)",
            config.max_room_id_length
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err("Room ID contains invalid characters".to_string());
    }
    Ok(trimmed.to_uppercase())
}

pub fn normalize_room_id(raw: &str) -> Result<RoomId, String> {
    normalize_room_id_with_config(raw, &ProtocolConfig::default())
}
