use super::SessionCoordinator;
use crate::coordination::{Delivery, FanOut};
use crate::error::GameError;
use crate::protocol::{ErrorCode, PlayerId, ServerMessage};
use std::sync::Arc;

impl SessionCoordinator {
    /// Send an error message to a specific player, tracking back-pressure metrics.
    pub async fn send_error_to_player(
        &self,
        player_id: &PlayerId,
        message: String,
        error_code: Option<ErrorCode>,
    ) {
        self.metrics.increment_errors_sent();
        self.send_to(
            player_id,
            Arc::new(ServerMessage::Error {
                message,
                error_code,
            }),
        )
        .await;
    }

    pub(crate) async fn send_game_error(&self, player_id: &PlayerId, error: &GameError) {
        if matches!(error, GameError::Validation(_)) {
            self.metrics.increment_validation_errors();
        }
        self.send_error_to_player(player_id, error.to_string(), Some(error.error_code()))
            .await;
    }

    pub(crate) async fn send_to(
        &self,
        player_id: &PlayerId,
        message: Arc<ServerMessage>,
    ) -> Delivery {
        let event = message.event_name();
        let delivery = self
            .message_coordinator
            .send_to_player(player_id, message)
            .await;
        if delivery == Delivery::Dropped {
            self.metrics.increment_websocket_messages_dropped();
            tracing::warn!(%player_id, event, "Outbound queue full or closed; message dropped");
        }
        delivery
    }

    /// Fan a message out to `recipients`; full queues lose only their own copy.
    pub(crate) async fn broadcast(
        &self,
        recipients: &[PlayerId],
        message: ServerMessage,
    ) -> FanOut {
        let event = message.event_name();
        let fan_out = self
            .message_coordinator
            .broadcast(recipients, Arc::new(message))
            .await;
        for _ in 0..fan_out.dropped {
            self.metrics.increment_websocket_messages_dropped();
        }
        if fan_out.dropped > 0 {
            tracing::warn!(
                event,
                dropped = fan_out.dropped,
                recipients = recipients.len(),
                "Broadcast dropped for slow recipients"
            );
        }
        fan_out
    }
}
