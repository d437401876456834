// Protocol module: message types, validation, and wire-level identifiers

pub mod error_codes;
pub mod messages;
pub mod room_ids;
pub mod types;
pub mod validation;

pub use error_codes::ErrorCode;

pub use types::{
    Inventory, Player, PlayerId, Position, RoomId, SignalKind, Stolen,
    DEFAULT_MAX_PLAYERS_PER_ROOM, DEFAULT_MAX_PLAYER_NAME_LENGTH, DEFAULT_MAX_ROOM_ID_LENGTH,
};

pub use messages::{ClientMessage, PlayerJoinedPayload, ServerMessage};
