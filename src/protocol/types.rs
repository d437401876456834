use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default constants for validation (can be overridden by config)
pub const DEFAULT_MAX_PLAYER_NAME_LENGTH: usize = 20;
pub const DEFAULT_MAX_ROOM_ID_LENGTH: usize = 32;
pub const DEFAULT_MAX_PLAYERS_PER_ROOM: usize = 6;

/// Unique identifier for a connection (and the player record bound to it)
pub type PlayerId = Uuid;
/// Rooms are keyed by their normalized, client-chosen token
pub type RoomId = String;

/// Guns and ammo held by a player. Counts never go below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub guns: u32,
    pub ammo: u32,
}

impl Inventory {
    pub const fn new(guns: u32, ammo: u32) -> Self {
        Self { guns, ammo }
    }

    /// An attacker needs at least one gun and one round.
    pub const fn can_attack(&self) -> bool {
        self.guns > 0 && self.ammo > 0
    }

    pub const fn total(&self) -> u64 {
        self.guns as u64 + self.ammo as u64
    }
}

/// Position on an unbounded plane. Clamping is a display concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Authoritative player record, also the wire shape used in rosters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub room: RoomId,
    pub inventory: Inventory,
    pub position: Position,
}

/// Amounts moved by a single steal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stolen {
    pub guns: u32,
    pub ammo: u32,
}

/// The three handshake payload kinds forwarded by the signaling relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    /// Event name used on the wire for this kind.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Offer => "voice-offer",
            Self::Answer => "voice-answer",
            Self::IceCandidate => "voice-ice-candidate",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}
