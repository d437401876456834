use super::message_router::parse_player_id;
use super::SessionCoordinator;
use crate::coordination::Delivery;
use crate::error::GameError;
use crate::protocol::room_ids::normalize_room_id_with_config;
use crate::protocol::{PlayerId, ServerMessage, SignalKind};
use std::sync::Arc;

impl SessionCoordinator {
    /// Forward a WebRTC handshake payload from `from` to `to`.
    ///
    /// Delivery is best effort: a recipient that is not connected (including
    /// an id that is not a UUID), or whose queue is full, silently loses the
    /// message. When room membership is enforced, both ends must currently
    /// be members of `room`.
    pub async fn relay_signal(
        &self,
        kind: SignalKind,
        from: &PlayerId,
        to: &str,
        room: &str,
        payload: serde_json::Value,
    ) -> Result<(), GameError> {
        let recipient = parse_player_id(to).filter(|id| self.connection_manager.has_client(id));

        let room_id = if self.config.signaling.enforce_room_membership {
            let room_id = normalize_room_id_with_config(room, &self.config.protocol)
                .map_err(GameError::Validation)?;
            if !self.rooms.is_member(&room_id, from) {
                self.metrics.increment_signals_rejected();
                tracing::debug!(%from, to, %room_id, signal = %kind, "Sender not in signaling room");
                return Err(GameError::SameRoomViolation);
            }
            Some(room_id)
        } else {
            None
        };

        let Some(to_id) = recipient else {
            self.metrics.increment_signals_dropped();
            tracing::trace!(%from, to, signal = %kind, "Signal recipient not connected");
            return Ok(());
        };

        if let Some(room_id) = &room_id {
            if !self.rooms.is_member(room_id, &to_id) {
                self.metrics.increment_signals_rejected();
                tracing::debug!(%from, to = %to_id, %room_id, signal = %kind, "Recipient not in signaling room");
                return Err(GameError::SameRoomViolation);
            }
        }

        let from_name = self.players.get(from).ok().map(|player| player.name);
        let message = Arc::new(ServerMessage::relayed_signal(kind, payload, *from, from_name));
        match self.send_to(&to_id, message).await {
            Delivery::Queued => {
                self.metrics.increment_signals_relayed();
                tracing::trace!(%from, to = %to_id, signal = %kind, "Signal relayed");
            }
            Delivery::Dropped | Delivery::Unknown => self.metrics.increment_signals_dropped(),
        }
        Ok(())
    }
}
