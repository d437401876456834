use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationError,
    MessageTooLarge,
    UnsupportedMessage,

    // Room and player errors
    RoomFull,
    DuplicateConnection,
    NotFound,
    SameRoomViolation,

    // Combat errors
    InsufficientResources,

    // Rate limiting
    RateLimitExceeded,
    TooManyConnections,

    // Server errors
    InternalError,
}

impl ErrorCode {
    /// Returns a human-readable description of this error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ValidationError => {
                "The request was malformed or failed validation. Check the event payload."
            }
            Self::MessageTooLarge => {
                "The message exceeds the maximum allowed size. Send a smaller payload."
            }
            Self::UnsupportedMessage => {
                "The event type is not recognized by this server and was rejected."
            }
            Self::RoomFull => {
                "The room has reached its maximum number of players. Try another room id."
            }
            Self::DuplicateConnection => {
                "This connection already has a player in a room and cannot join again."
            }
            Self::NotFound => {
                "The referenced player or room does not exist or has already disconnected."
            }
            Self::SameRoomViolation => {
                "Both players must be members of the same room for this action."
            }
            Self::InsufficientResources => {
                "At least one gun and one round of ammo are required to attack."
            }
            Self::RateLimitExceeded => {
                "Too many requests in a short period. Wait before retrying."
            }
            Self::TooManyConnections => {
                "Too many simultaneous connections from your address. Close one and retry."
            }
            Self::InternalError => {
                "An unexpected server error occurred. The request was not applied."
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_error_codes_have_descriptions() {
        let error_codes = [
            ErrorCode::ValidationError,
            ErrorCode::MessageTooLarge,
            ErrorCode::UnsupportedMessage,
            ErrorCode::RoomFull,
            ErrorCode::DuplicateConnection,
            ErrorCode::NotFound,
            ErrorCode::SameRoomViolation,
            ErrorCode::InsufficientResources,
            ErrorCode::RateLimitExceeded,
            ErrorCode::TooManyConnections,
            ErrorCode::InternalError,
        ];

        for error_code in &error_codes {
            let description = error_code.description();
            assert!(
                description.len() > 10,
                "ErrorCode::{:?} has suspiciously short description: '{}'",
                error_code,
                description
            );
        }
    }

    #[test]
    fn test_display_uses_description() {
        let error = ErrorCode::NotFound;
        assert_eq!(format!("{error}"), error.description());
    }

    #[test]
    fn test_serialization_is_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::SameRoomViolation).unwrap();
        assert_eq!(json, "\"SAME_ROOM_VIOLATION\"");
        let json = serde_json::to_string(&ErrorCode::InsufficientResources).unwrap();
        assert_eq!(json, "\"INSUFFICIENT_RESOURCES\"");
    }
}
