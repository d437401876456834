use thiserror::Error;

use crate::protocol::ErrorCode;

/// Errors produced while handling a single client event.
///
/// Every variant is recoverable: the dispatcher turns it into one `error`
/// frame for the initiating connection and keeps serving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Room is full! Maximum {max_players} players allowed.")]
    RoomFull { max_players: usize },
    #[error("Already in a room")]
    DuplicateConnection,
    #[error("Player not found")]
    NotFound,
    #[error("Players not in same room")]
    SameRoomViolation,
    #[error("You need guns and ammo to attack!")]
    InsufficientResources,
    #[error("{0}")]
    Validation(String),
    #[error("Unsupported event: {0}")]
    UnsupportedMessage(String),
    #[error("Message too large ({size} bytes, max {max} bytes)")]
    MessageTooLarge { size: usize, max: usize },
    #[error("Too many join attempts. Try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },
}

impl From<crate::rate_limit::RateLimitError> for GameError {
    fn from(err: crate::rate_limit::RateLimitError) -> Self {
        Self::RateLimited {
            retry_after_secs: err.retry_after().as_secs(),
        }
    }
}

impl GameError {
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::RoomFull { .. } => ErrorCode::RoomFull,
            Self::DuplicateConnection => ErrorCode::DuplicateConnection,
            Self::NotFound => ErrorCode::NotFound,
            Self::SameRoomViolation => ErrorCode::SameRoomViolation,
            Self::InsufficientResources => ErrorCode::InsufficientResources,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::UnsupportedMessage(_) => ErrorCode::UnsupportedMessage,
            Self::MessageTooLarge { .. } => ErrorCode::MessageTooLarge,
            Self::RateLimited { .. } => ErrorCode::RateLimitExceeded,
        }
    }
}
