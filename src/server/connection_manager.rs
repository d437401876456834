use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::coordination::MessageCoordinator;
use crate::metrics::ServerMetrics;
use crate::protocol::{PlayerId, RoomId, ServerMessage};

use super::RegisterClientError;

/// Per-connection state. `room_id` is `None` until a join succeeds.
#[derive(Debug, Clone)]
pub(crate) struct ClientConnection {
    pub room_id: Option<RoomId>,
    pub client_addr: SocketAddr,
    pub connected_at: Instant,
}

pub(crate) struct ConnectionManager {
    clients: DashMap<PlayerId, ClientConnection>,
    connections_per_ip: DashMap<IpAddr, usize>,
    metrics: Arc<ServerMetrics>,
    message_coordinator: Arc<dyn MessageCoordinator>,
    max_connections_per_ip: usize,
}

impl ConnectionManager {
    pub fn new(
        max_connections_per_ip: usize,
        metrics: Arc<ServerMetrics>,
        message_coordinator: Arc<dyn MessageCoordinator>,
    ) -> Self {
        Self {
            clients: DashMap::new(),
            connections_per_ip: DashMap::new(),
            metrics,
            message_coordinator,
            max_connections_per_ip,
        }
    }

    /// Accept a new connection and assign it a fresh id.
    pub async fn register_client(
        &self,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        client_addr: SocketAddr,
    ) -> Result<PlayerId, RegisterClientError> {
        let ip = client_addr.ip();
        if let Err(current) = self.try_reserve_ip_slot(ip) {
            warn!(
                %ip,
                current,
                max = self.max_connections_per_ip,
                "IP connection limit exceeded"
            );
            self.metrics.increment_connections_rejected();
            return Err(RegisterClientError::IpLimitExceeded {
                current,
                limit: self.max_connections_per_ip,
            });
        }

        let player_id = Uuid::new_v4();
        self.insert(player_id, sender, client_addr).await;
        info!(%player_id, %client_addr, "Client registered");
        Ok(player_id)
    }

    /// Register a connection under a caller-chosen id, bypassing the IP limit.
    pub async fn connect_test_client(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        client_addr: SocketAddr,
    ) {
        self.increment_ip_slot_unbounded(client_addr.ip());
        self.insert(player_id, sender, client_addr).await;
    }

    async fn insert(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        client_addr: SocketAddr,
    ) {
        self.clients.insert(
            player_id,
            ClientConnection {
                room_id: None,
                client_addr,
                connected_at: Instant::now(),
            },
        );
        self.metrics.increment_connections();
        self.message_coordinator
            .register_local_client(player_id, sender)
            .await;
    }

    pub fn assign_client_to_room(&self, player_id: &PlayerId, room_id: RoomId) -> bool {
        self.clients
            .get_mut(player_id)
            .map(|mut client| client.room_id = Some(room_id))
            .is_some()
    }

    pub fn get_client_room(&self, player_id: &PlayerId) -> Option<RoomId> {
        self.clients
            .get(player_id)
            .and_then(|client| client.room_id.clone())
    }

    pub fn has_client(&self, player_id: &PlayerId) -> bool {
        self.clients.contains_key(player_id)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Forget the connection and release its IP slot. Returns `None` if already gone.
    pub async fn remove_client(&self, player_id: &PlayerId) -> Option<ClientConnection> {
        let (_, connection) = self.clients.remove(player_id)?;
        self.release_ip_slot(connection.client_addr.ip());
        self.message_coordinator
            .unregister_local_client(player_id)
            .await;
        Some(connection)
    }

    fn try_reserve_ip_slot(&self, ip: IpAddr) -> Result<usize, usize> {
        match self.connections_per_ip.entry(ip) {
            Entry::Occupied(mut entry) => {
                let count = entry.get_mut();
                if *count >= self.max_connections_per_ip {
                    Err(*count)
                } else {
                    *count += 1;
                    Ok(*count)
                }
            }
            Entry::Vacant(entry) => {
                if self.max_connections_per_ip == 0 {
                    Err(0)
                } else {
                    entry.insert(1);
                    Ok(1)
                }
            }
        }
    }

    fn increment_ip_slot_unbounded(&self, ip: IpAddr) {
        *self.connections_per_ip.entry(ip).or_insert(0) += 1;
    }

    fn release_ip_slot(&self, ip: IpAddr) {
        if let Some(mut entry) = self.connections_per_ip.get_mut(&ip) {
            if *entry > 1 {
                *entry -= 1;
                return;
            }
        }
        self.connections_per_ip.remove(&ip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{Delivery, InMemoryMessageCoordinator};

    fn make_manager(
        max_connections_per_ip: usize,
    ) -> (ConnectionManager, Arc<InMemoryMessageCoordinator>) {
        let metrics = Arc::new(ServerMetrics::new());
        let coordinator = Arc::new(InMemoryMessageCoordinator::new());
        let manager = ConnectionManager::new(
            max_connections_per_ip,
            metrics,
            coordinator.clone() as Arc<dyn MessageCoordinator>,
        );
        (manager, coordinator)
    }

    #[tokio::test]
    async fn register_client_enforces_ip_limits_and_releases_on_remove() {
        let (manager, _) = make_manager(1);
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        let (tx1, _rx1) = mpsc::channel(4);
        let first_id = manager
            .register_client(tx1, addr)
            .await
            .expect("first registration succeeds");

        let (tx2, _rx2) = mpsc::channel(4);
        let err = manager
            .register_client(tx2, "127.0.0.1:5001".parse().unwrap())
            .await
            .expect_err("second client hits per-IP limit");
        let RegisterClientError::IpLimitExceeded { current, limit } = err;
        assert_eq!((current, limit), (1, 1));

        assert!(manager.remove_client(&first_id).await.is_some());
        assert!(manager.remove_client(&first_id).await.is_none());

        let (tx3, _rx3) = mpsc::channel(4);
        manager
            .register_client(tx3, addr)
            .await
            .expect("registrations resume after slot release");
    }

    #[tokio::test]
    async fn room_assignment_round_trip() {
        let (manager, _) = make_manager(4);
        let (tx, _rx) = mpsc::channel(4);
        let id = manager
            .register_client(tx, "10.0.0.1:1".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(manager.get_client_room(&id), None);
        assert!(manager.assign_client_to_room(&id, "ABCD".to_string()));
        assert_eq!(manager.get_client_room(&id).as_deref(), Some("ABCD"));
        assert!(!manager.assign_client_to_room(&Uuid::new_v4(), "ABCD".to_string()));
    }

    #[tokio::test]
    async fn removal_unregisters_from_coordinator() {
        let (manager, coordinator) = make_manager(4);
        let (tx, _rx) = mpsc::channel(4);
        let id = manager
            .register_client(tx, "10.0.0.2:1".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(coordinator.client_count(), 1);

        manager.remove_client(&id).await;
        let message = Arc::new(ServerMessage::Connected { player_id: id });
        assert_eq!(coordinator.send_to_player(&id, message).await, Delivery::Unknown);
    }
}
