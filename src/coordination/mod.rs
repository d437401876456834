//! Outbound message delivery.
//!
//! Every connection owns a bounded queue drained by its WebSocket write task.
//! The coordinator only ever uses `try_send`, so a slow client loses its own
//! messages without stalling the caller or any other recipient.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::protocol::{PlayerId, ServerMessage};

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued on the recipient's channel.
    Queued,
    /// Recipient's queue was full or its writer has gone away.
    Dropped,
    /// No connection is registered under that id.
    Unknown,
}

/// Totals for one multi-recipient send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    pub queued: usize,
    pub dropped: usize,
    pub unknown: usize,
}

impl FanOut {
    fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Queued => self.queued += 1,
            Delivery::Dropped => self.dropped += 1,
            Delivery::Unknown => self.unknown += 1,
        }
    }
}

#[async_trait::async_trait]
pub trait MessageCoordinator: Send + Sync {
    async fn register_local_client(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    );

    async fn unregister_local_client(&self, player_id: &PlayerId);

    async fn send_to_player(&self, player_id: &PlayerId, message: Arc<ServerMessage>) -> Delivery;

    /// Deliver one shared message to every id in `recipients`.
    async fn broadcast(&self, recipients: &[PlayerId], message: Arc<ServerMessage>) -> FanOut {
        let mut report = FanOut::default();
        for player_id in recipients {
            let delivery = self.send_to_player(player_id, Arc::clone(&message)).await;
            report.record(delivery);
        }
        report
    }
}

/// Single-process coordinator backed by a map of connection senders.
#[derive(Debug, Default)]
pub struct InMemoryMessageCoordinator {
    local_clients: DashMap<PlayerId, mpsc::Sender<Arc<ServerMessage>>>,
}

impl InMemoryMessageCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_count(&self) -> usize {
        self.local_clients.len()
    }
}

#[async_trait::async_trait]
impl MessageCoordinator for InMemoryMessageCoordinator {
    async fn register_local_client(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    ) {
        self.local_clients.insert(player_id, sender);
    }

    async fn unregister_local_client(&self, player_id: &PlayerId) {
        self.local_clients.remove(player_id);
    }

    async fn send_to_player(&self, player_id: &PlayerId, message: Arc<ServerMessage>) -> Delivery {
        // Clone the sender so no map guard is held while sending
        let Some(sender) = self
            .local_clients
            .get(player_id)
            .map(|entry| entry.value().clone())
        else {
            tracing::debug!(%player_id, event = message.event_name(), "Recipient not connected");
            return Delivery::Unknown;
        };

        match sender.try_send(message) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(message)) => {
                tracing::warn!(%player_id, event = message.event_name(), "Outbound queue full, dropping message");
                Delivery::Dropped
            }
            Err(TrySendError::Closed(message)) => {
                tracing::debug!(%player_id, event = message.event_name(), "Outbound queue closed, dropping message");
                Delivery::Dropped
            }
        }
    }
}
