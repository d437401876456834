use crate::error::GameError;
use crate::protocol::ClientMessage;
use serde_json::Value;

/// Event names the server understands.
const KNOWN_EVENTS: &[&str] = &[
    "joinRoom",
    "steal",
    "attack",
    "movePlayer",
    "voice-offer",
    "voice-answer",
    "voice-ice-candidate",
];

/// Why an inbound text frame could not be turned into a [`ClientMessage`].
#[derive(Debug)]
pub(super) enum FrameRejection {
    InvalidJson(serde_json::Error),
    MalformedEnvelope,
    UnknownType(String),
    InvalidPayload(serde_json::Error),
}

impl From<FrameRejection> for GameError {
    fn from(rejection: FrameRejection) -> Self {
        match rejection {
            FrameRejection::InvalidJson(err) | FrameRejection::InvalidPayload(err) => {
                Self::Validation(format!("Malformed message: {err}"))
            }
            FrameRejection::MalformedEnvelope => Self::Validation(
                "Malformed message: expected an object with a string `type`".to_string(),
            ),
            FrameRejection::UnknownType(kind) => Self::UnsupportedMessage(kind),
        }
    }
}

/// Decode one text frame. Unknown event types are reported separately from
/// payloads that fail to match a known event.
pub(super) fn parse_client_message(raw_text: &str) -> Result<ClientMessage, FrameRejection> {
    let value: Value = serde_json::from_str(raw_text).map_err(FrameRejection::InvalidJson)?;
    let kind = value
        .as_object()
        .and_then(|obj| obj.get("type"))
        .and_then(Value::as_str)
        .ok_or(FrameRejection::MalformedEnvelope)?;
    if !KNOWN_EVENTS.contains(&kind) {
        return Err(FrameRejection::UnknownType(kind.to_string()));
    }
    serde_json::from_value(value).map_err(FrameRejection::InvalidPayload)
}
