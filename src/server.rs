use crate::config::{GameConfig, ProtocolConfig, SignalingConfig, WebSocketConfig};
use crate::coordination::{InMemoryMessageCoordinator, MessageCoordinator};
use crate::metrics::ServerMetrics;
use crate::protocol::{Player, PlayerId, RoomId, ServerMessage};
use crate::rate_limit::{JoinRateLimiter, RateLimitConfig};
use crate::registry::{PlayerRegistry, RoomLocks, RoomRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

mod combat_service;
mod connection_manager;
mod message_router;
mod messaging;
mod room_service;
#[cfg(test)]
mod room_service_tests;
mod signaling;
#[cfg(test)]
mod signaling_tests;

use connection_manager::ConnectionManager;

/// Session coordinator: owns the registries and routes every inbound event.
///
/// Connection state is tracked per id as `Connected` (no room) or `InRoom`;
/// all state-changing events take the lock of the room they act in and
/// release it before fanning out.
pub struct SessionCoordinator {
    /// Connection management (clients, IP accounting)
    connection_manager: ConnectionManager,
    /// Authoritative player records
    players: PlayerRegistry,
    /// Room membership sets
    rooms: RoomRegistry,
    /// Per-room exclusivity for multi-record updates
    room_locks: RoomLocks,
    /// Per-connection join limiter
    rate_limiter: JoinRateLimiter,
    /// Server configuration
    config: ServerConfig,
    /// Server metrics
    pub(crate) metrics: Arc<ServerMetrics>,
    /// Outbound delivery to connected clients
    message_coordinator: Arc<dyn MessageCoordinator>,
    /// Instance identifier
    instance_id: Uuid,
}

#[derive(Debug, Error)]
pub enum RegisterClientError {
    #[error("Too many connections from your IP ({current}/{limit})")]
    IpLimitExceeded { current: usize, limit: usize },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub game: GameConfig,
    pub protocol: ProtocolConfig,
    pub signaling: SignalingConfig,
    pub rate_limit_config: RateLimitConfig,
    pub max_message_size: usize,
    pub max_connections_per_ip: usize,
    pub require_metrics_auth: bool,
    pub metrics_auth_token: Option<String>,
    pub websocket_config: WebSocketConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&crate::config::Config::default())
    }
}

impl From<&crate::config::Config> for ServerConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            game: config.game.clone(),
            protocol: config.protocol.clone(),
            signaling: config.signaling.clone(),
            rate_limit_config: RateLimitConfig::from(&config.rate_limit),
            max_message_size: config.security.max_message_size,
            max_connections_per_ip: config.security.max_connections_per_ip,
            require_metrics_auth: config.security.require_metrics_auth,
            metrics_auth_token: config.security.metrics_auth_token.clone(),
            websocket_config: config.websocket.clone(),
        }
    }
}

impl SessionCoordinator {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let message_coordinator: Arc<dyn MessageCoordinator> =
            Arc::new(InMemoryMessageCoordinator::new());
        Self::with_message_coordinator(config, message_coordinator)
    }

    /// Build a coordinator that delivers through the supplied coordinator.
    pub fn with_message_coordinator(
        config: ServerConfig,
        message_coordinator: Arc<dyn MessageCoordinator>,
    ) -> Arc<Self> {
        let instance_id = Uuid::new_v4();
        let metrics = Arc::new(ServerMetrics::new());
        let connection_manager = ConnectionManager::new(
            config.max_connections_per_ip,
            metrics.clone(),
            message_coordinator.clone(),
        );

        tracing::info!(
            %instance_id,
            max_players_per_room = config.game.max_players_per_room,
            enforce_signaling_membership = config.signaling.enforce_room_membership,
            "Session coordinator initialized"
        );

        Arc::new(Self {
            connection_manager,
            players: PlayerRegistry::new(),
            rooms: RoomRegistry::new(config.game.max_players_per_room),
            room_locks: RoomLocks::new(),
            rate_limiter: JoinRateLimiter::new(config.rate_limit_config.clone()),
            config,
            metrics,
            message_coordinator,
            instance_id,
        })
    }

    /// Register a new client connection
    pub async fn register_client(
        &self,
        sender: mpsc::Sender<Arc<ServerMessage>>,
        client_addr: SocketAddr,
    ) -> Result<PlayerId, RegisterClientError> {
        self.connection_manager
            .register_client(sender, client_addr)
            .await
    }

    /// Connect a client with a specific player ID (used for testing)
    pub async fn connect_client(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    ) {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        self.connection_manager
            .connect_test_client(player_id, sender, addr)
            .await;
        tracing::info!(%player_id, instance_id = %self.instance_id, "Client connected");
    }

    /// Disconnect a client (alias for unregister_client for testing compatibility)
    pub async fn disconnect_client(&self, player_id: &PlayerId) {
        self.unregister_client(player_id).await;
    }

    /// Unregister a client connection. Safe to call more than once.
    ///
    /// The connection entry goes first: a join still in flight then fails its
    /// room assignment and rolls back, or it already assigned the room and the
    /// leave below waits on the room lock to clean it up.
    pub async fn unregister_client(&self, player_id: &PlayerId) {
        let Some(connection) = self.connection_manager.remove_client(player_id).await else {
            return;
        };
        self.metrics.decrement_active_connections();
        self.rate_limiter.forget(player_id);

        if let Some(room_id) = connection.room_id {
            self.leave_room(player_id, &room_id).await;
        }
        tracing::info!(%player_id, "Client disconnected");
    }

    pub fn get_client_room(&self, player_id: &PlayerId) -> Option<RoomId> {
        self.connection_manager.get_client_room(player_id)
    }

    pub fn is_connected(&self, player_id: &PlayerId) -> bool {
        self.connection_manager.has_client(player_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connection_manager.client_count()
    }

    /// Current record for a player, if they have joined a room.
    pub fn player(&self, player_id: &PlayerId) -> Option<Player> {
        self.players.get(player_id).ok()
    }

    /// Members of a room in join order; empty if the room does not exist.
    pub fn room_members(&self, room_id: &str) -> Vec<PlayerId> {
        self.rooms.members(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.room_count()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        self.metrics.clone()
    }

    #[cfg(test)]
    pub(crate) fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    #[cfg(test)]
    pub(crate) fn room_lock_count(&self) -> usize {
        self.room_locks.len()
    }
}
