use super::SessionCoordinator;
use crate::error::GameError;
use crate::protocol::room_ids::normalize_room_id_with_config;
use crate::protocol::validation::validate_player_name_with_config;
use crate::protocol::{PlayerId, PlayerJoinedPayload, ServerMessage};
use crate::registry::{JoinOutcome, LeaveOutcome};
use tokio::sync::OwnedMutexGuard;
use tracing::Instrument;

impl SessionCoordinator {
    /// Join (or create) a room. On success every member, joiner included,
    /// receives `playerJoined` with the full roster.
    pub async fn handle_join_room(
        &self,
        player_id: &PlayerId,
        name: String,
        room_id: String,
    ) -> Result<(), GameError> {
        let room_join_span = tracing::info_span!(
            "room.join",
            player_id = %player_id,
            requested_room_id = %room_id,
            room_id = tracing::field::Empty,
            instance_id = %self.instance_id
        );

        let result = self
            .join_room_inner(player_id, name, room_id)
            .instrument(room_join_span)
            .await;
        if let Err(ref error) = result {
            self.metrics.increment_room_join_failures();
            if matches!(error, GameError::RateLimited { .. }) {
                self.metrics.increment_rate_limit_rejections();
            }
        }
        result
    }

    async fn join_room_inner(
        &self,
        player_id: &PlayerId,
        name: String,
        room_id: String,
    ) -> Result<(), GameError> {
        if !self.connection_manager.has_client(player_id) {
            return Err(GameError::NotFound);
        }
        if self.connection_manager.get_client_room(player_id).is_some() {
            return Err(GameError::DuplicateConnection);
        }
        self.rate_limiter.check_join_attempt(player_id)?;

        let name = validate_player_name_with_config(&name, &self.config.protocol)
            .map_err(GameError::Validation)?;
        let room_id = normalize_room_id_with_config(&room_id, &self.config.protocol)
            .map_err(GameError::Validation)?;
        tracing::Span::current().record("room_id", tracing::field::display(&room_id));

        let guard = self.room_locks.lock(&room_id).await;

        let outcome = match self.rooms.join(&room_id, *player_id) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.release_room(guard, &room_id);
                tracing::info!(error = %error, "Room join rejected");
                return Err(error);
            }
        };

        let player = match self
            .players
            .create(*player_id, name, room_id.clone(), &self.config.game)
        {
            Ok(player) => player,
            Err(error) => {
                self.rooms.leave(&room_id, player_id);
                self.release_room(guard, &room_id);
                tracing::error!(error = %error, "Player record already existed; join rolled back");
                return Err(error);
            }
        };

        if !self
            .connection_manager
            .assign_client_to_room(player_id, room_id.clone())
        {
            self.players.remove(player_id);
            self.rooms.leave(&room_id, player_id);
            self.release_room(guard, &room_id);
            self.rate_limiter.forget(player_id);
            tracing::warn!("Connection closed while joining; join rolled back");
            return Err(GameError::NotFound);
        }

        let members = self.rooms.members(&room_id);
        let roster = self.players.snapshot(&members);
        self.release_room(guard, &room_id);

        if outcome == JoinOutcome::Created {
            self.metrics.increment_rooms_created();
        }
        self.metrics.increment_players_joined();
        tracing::info!(
            player_name = %player.name,
            guns = player.inventory.guns,
            ammo = player.inventory.ammo,
            member_count = members.len(),
            created = outcome == JoinOutcome::Created,
            "Player joined room"
        );

        self.broadcast(
            &members,
            ServerMessage::PlayerJoined(Box::new(PlayerJoinedPayload {
                player,
                players: roster,
            })),
        )
        .await;
        Ok(())
    }

    /// Remove a player from their room and notify whoever is left.
    ///
    /// A second call for the same player finds nothing to remove and is silent.
    pub(crate) async fn leave_room(&self, player_id: &PlayerId, room_id: &str) {
        let leave_span = tracing::info_span!(
            "room.leave",
            player_id = %player_id,
            room_id = %room_id,
            instance_id = %self.instance_id
        );

        async {
            let guard = self.room_locks.lock(room_id).await;
            let removed = self.players.remove(player_id);
            let outcome = self.rooms.leave(room_id, player_id);
            let remaining = self.rooms.members(room_id);
            self.release_room(guard, room_id);

            if outcome == LeaveOutcome::RoomDeleted {
                self.metrics.increment_rooms_deleted();
                tracing::info!("Room deleted after last member left");
            }

            let Some(player) = removed else {
                return;
            };
            self.metrics.increment_players_left();
            tracing::info!(
                player_name = %player.name,
                remaining = remaining.len(),
                "Player left room"
            );

            if !remaining.is_empty() {
                self.broadcast(
                    &remaining,
                    ServerMessage::PlayerLeft {
                        player_id: *player_id,
                        player_name: player.name,
                    },
                )
                .await;
            }
        }
        .instrument(leave_span)
        .await;
    }

    /// Release a room guard and drop the lock entry if nobody else wants it.
    pub(crate) fn release_room(&self, guard: OwnedMutexGuard<()>, room_id: &str) {
        drop(guard);
        self.room_locks.prune(room_id);
    }
}
