use super::SessionCoordinator;
use crate::combat::{resolve_attack, resolve_move, resolve_steal};
use crate::error::GameError;
use crate::protocol::validation::validate_coordinates;
use crate::protocol::{PlayerId, RoomId, ServerMessage};

impl SessionCoordinator {
    /// Steal from `target_id`; the result goes to everyone in the thief's room.
    pub async fn handle_steal(
        &self,
        player_id: &PlayerId,
        target_id: &PlayerId,
    ) -> Result<(), GameError> {
        let room_id = self.current_room(player_id)?;

        let guard = self.room_locks.lock(&room_id).await;
        let resolved = resolve_steal(&self.players, &self.config.game, player_id, target_id);
        let members = self.rooms.members(&room_id);
        self.release_room(guard, &room_id);

        let outcome = resolved?;
        self.metrics.increment_steals();
        tracing::info!(
            %player_id,
            %target_id,
            %room_id,
            stolen_guns = outcome.stolen.guns,
            stolen_ammo = outcome.stolen.ammo,
            "Steal resolved"
        );

        self.broadcast(
            &members,
            ServerMessage::StealAction {
                thief: outcome.thief,
                target: outcome.target,
                stolen: outcome.stolen,
            },
        )
        .await;
        Ok(())
    }

    /// Spend a round on `target_id`; reported to the attacker's room.
    pub async fn handle_attack(
        &self,
        player_id: &PlayerId,
        target_id: &PlayerId,
    ) -> Result<(), GameError> {
        let room_id = self.current_room(player_id)?;

        let guard = self.room_locks.lock(&room_id).await;
        let resolved = resolve_attack(&self.players, &self.config.game, player_id, target_id);
        let members = self.rooms.members(&room_id);
        self.release_room(guard, &room_id);

        let outcome = resolved?;
        self.metrics.increment_attacks();
        tracing::info!(
            %player_id,
            %target_id,
            %room_id,
            ammo_left = outcome.attacker.inventory.ammo,
            "Attack resolved"
        );

        self.broadcast(
            &members,
            ServerMessage::AttackAction {
                attacker: outcome.attacker,
                target: outcome.target,
            },
        )
        .await;
        Ok(())
    }

    /// Overwrite the mover's position and tell the rest of the room.
    pub async fn handle_move(&self, player_id: &PlayerId, x: f64, y: f64) -> Result<(), GameError> {
        validate_coordinates(x, y).map_err(GameError::Validation)?;
        let room_id = self.current_room(player_id)?;

        let guard = self.room_locks.lock(&room_id).await;
        let resolved = resolve_move(&self.players, player_id, x, y);
        let others: Vec<PlayerId> = self
            .rooms
            .members(&room_id)
            .into_iter()
            .filter(|member| member != player_id)
            .collect();
        self.release_room(guard, &room_id);

        let player = resolved?;
        self.metrics.increment_moves();
        tracing::trace!(%player_id, x, y, "Player moved");

        if !others.is_empty() {
            self.broadcast(
                &others,
                ServerMessage::PlayerMoved {
                    player_id: *player_id,
                    position: player.position,
                },
            )
            .await;
        }
        Ok(())
    }

    /// Room of a connection that has joined; actions before joining are `NotFound`.
    fn current_room(&self, player_id: &PlayerId) -> Result<RoomId, GameError> {
        self.connection_manager
            .get_client_room(player_id)
            .ok_or(GameError::NotFound)
    }
}
