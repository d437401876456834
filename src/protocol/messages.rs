use serde::{Deserialize, Serialize};

use super::error_codes::ErrorCode;
use super::types::{Player, PlayerId, Position, SignalKind, Stolen};

/// Message types sent from client to server
///
/// Target ids stay strings on the wire; one that is not a UUID is just an
/// unknown player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    /// Join (or implicitly create) a named room
    #[serde(rename = "joinRoom", rename_all = "camelCase")]
    JoinRoom { name: String, room_id: String },
    /// Take guns/ammo from a room-mate
    #[serde(rename = "steal", rename_all = "camelCase")]
    Steal { target_player_id: String },
    /// Spend a round on another player
    #[serde(rename = "attack", rename_all = "camelCase")]
    Attack { target_player_id: String },
    /// Overwrite own position
    #[serde(rename = "movePlayer")]
    MovePlayer { x: f64, y: f64 },
    /// WebRTC offer destined for a single peer
    #[serde(rename = "voice-offer")]
    VoiceOffer {
        offer: serde_json::Value,
        to: String,
        room: String,
    },
    /// WebRTC answer destined for a single peer
    #[serde(rename = "voice-answer")]
    VoiceAnswer {
        answer: serde_json::Value,
        to: String,
        room: String,
    },
    /// Trickled ICE candidate destined for a single peer
    #[serde(rename = "voice-ice-candidate")]
    VoiceIceCandidate {
        candidate: serde_json::Value,
        to: String,
        room: String,
    },
}

impl ClientMessage {
    /// Wire name of the event, used for logging and latency tracking.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "joinRoom",
            Self::Steal { .. } => "steal",
            Self::Attack { .. } => "attack",
            Self::MovePlayer { .. } => "movePlayer",
            Self::VoiceOffer { .. } => SignalKind::Offer.event_name(),
            Self::VoiceAnswer { .. } => SignalKind::Answer.event_name(),
            Self::VoiceIceCandidate { .. } => SignalKind::IceCandidate.event_name(),
        }
    }
}

/// Payload for the playerJoined broadcast: the joiner plus the full roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerJoinedPayload {
    pub player: Player,
    pub players: Vec<Player>,
}

/// Message types sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// First frame on every connection: tells the client its own id
    #[serde(rename = "connected", rename_all = "camelCase")]
    Connected { player_id: PlayerId },
    /// A player joined; sent to every member including the joiner
    #[serde(rename = "playerJoined")]
    PlayerJoined(Box<PlayerJoinedPayload>),
    /// Result of a steal, with both records after the transfer
    #[serde(rename = "stealAction")]
    StealAction {
        thief: Player,
        target: Player,
        stolen: Stolen,
    },
    /// An attack happened; attacker record reflects the spent round
    #[serde(rename = "attackAction")]
    AttackAction { attacker: Player, target: Player },
    /// Someone else moved
    #[serde(rename = "playerMoved", rename_all = "camelCase")]
    PlayerMoved {
        player_id: PlayerId,
        position: Position,
    },
    /// A room-mate disconnected
    #[serde(rename = "playerLeft", rename_all = "camelCase")]
    PlayerLeft {
        player_id: PlayerId,
        player_name: String,
    },
    /// Relayed WebRTC offer
    #[serde(rename = "voice-offer", rename_all = "camelCase")]
    VoiceOffer {
        offer: serde_json::Value,
        from: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_name: Option<String>,
    },
    /// Relayed WebRTC answer
    #[serde(rename = "voice-answer", rename_all = "camelCase")]
    VoiceAnswer {
        answer: serde_json::Value,
        from: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_name: Option<String>,
    },
    /// Relayed ICE candidate
    #[serde(rename = "voice-ice-candidate", rename_all = "camelCase")]
    VoiceIceCandidate {
        candidate: serde_json::Value,
        from: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_name: Option<String>,
    },
    /// Error message, only ever sent to the connection that caused it
    #[serde(rename = "error", rename_all = "camelCase")]
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_code: Option<ErrorCode>,
    },
}

impl ServerMessage {
    /// Build the outbound relay frame for a signaling payload.
    pub fn relayed_signal(
        kind: SignalKind,
        payload: serde_json::Value,
        from: PlayerId,
        from_name: Option<String>,
    ) -> Self {
        match kind {
            SignalKind::Offer => Self::VoiceOffer {
                offer: payload,
                from,
                from_name,
            },
            SignalKind::Answer => Self::VoiceAnswer {
                answer: payload,
                from,
                from_name,
            },
            SignalKind::IceCandidate => Self::VoiceIceCandidate {
                candidate: payload,
                from,
                from_name,
            },
        }
    }

    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::PlayerJoined(_) => "playerJoined",
            Self::StealAction { .. } => "stealAction",
            Self::AttackAction { .. } => "attackAction",
            Self::PlayerMoved { .. } => "playerMoved",
            Self::PlayerLeft { .. } => "playerLeft",
            Self::VoiceOffer { .. } => SignalKind::Offer.event_name(),
            Self::VoiceAnswer { .. } => SignalKind::Answer.event_name(),
            Self::VoiceIceCandidate { .. } => SignalKind::IceCandidate.event_name(),
            Self::Error { .. } => "error",
        }
    }
}
