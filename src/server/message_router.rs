use crate::error::GameError;
use crate::metrics::OperationTimer;
use crate::protocol::{ClientMessage, PlayerId, SignalKind};

use super::SessionCoordinator;

impl SessionCoordinator {
    /// Handle one inbound client event. Failures are reported to the sender only.
    pub async fn handle_client_message(&self, player_id: &PlayerId, message: ClientMessage) {
        let event = message.event_name();
        let timer = OperationTimer::new(event, self.metrics.clone());

        let result = match message {
            ClientMessage::JoinRoom { name, room_id } => {
                self.handle_join_room(player_id, name, room_id).await
            }
            ClientMessage::Steal { target_player_id } => match parse_player_id(&target_player_id) {
                Some(target_id) => self.handle_steal(player_id, &target_id).await,
                None => Err(GameError::NotFound),
            },
            ClientMessage::Attack { target_player_id } => match parse_player_id(&target_player_id) {
                Some(target_id) => self.handle_attack(player_id, &target_id).await,
                None => Err(GameError::NotFound),
            },
            ClientMessage::MovePlayer { x, y } => self.handle_move(player_id, x, y).await,
            ClientMessage::VoiceOffer { offer, to, room } => {
                self.relay_signal(SignalKind::Offer, player_id, &to, &room, offer)
                    .await
            }
            ClientMessage::VoiceAnswer { answer, to, room } => {
                self.relay_signal(SignalKind::Answer, player_id, &to, &room, answer)
                    .await
            }
            ClientMessage::VoiceIceCandidate {
                candidate,
                to,
                room,
            } => {
                self.relay_signal(SignalKind::IceCandidate, player_id, &to, &room, candidate)
                    .await
            }
        };

        if let Err(error) = result {
            self.report_failure(player_id, event, &error).await;
        }
        timer.finish().await;
    }

    async fn report_failure(&self, player_id: &PlayerId, event: &'static str, error: &GameError) {
        tracing::debug!(%player_id, event, error = %error, "Event rejected");
        self.send_game_error(player_id, error).await;
    }
}

/// Wire ids are free-form strings; anything that is not a UUID names no connection.
pub(super) fn parse_player_id(raw: &str) -> Option<PlayerId> {
    PlayerId::parse_str(raw.trim()).ok()
}
