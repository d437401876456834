use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::RngExt;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::protocol::{Inventory, Player, PlayerId, Position, RoomId};

/// Build a fresh player record with rolled starting inventory and spawn point.
pub fn roll_initial_player(id: PlayerId, name: String, room: RoomId, game: &GameConfig) -> Player {
    let mut rng = rand::rng();
    let guns = rng.random_range(game.initial_guns_min..=game.initial_guns_max);
    let ammo = rng.random_range(game.initial_ammo_min..=game.initial_ammo_max);
    let x = rng.random_range(0.0..game.spawn_width);
    let y = rng.random_range(0.0..game.spawn_height);

    Player {
        id,
        name,
        room,
        inventory: Inventory::new(guns, ammo),
        position: Position::new(x, y),
    }
}

/// Owns every live player record, keyed by connection id.
///
/// Each record is independently locked; callers that need two records to
/// change together hold the room lock from [`super::RoomLocks`] around the
/// pair of [`PlayerRegistry::mutate`] calls.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: DashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll and store a new record for `id`.
    pub fn create(
        &self,
        id: PlayerId,
        name: String,
        room: RoomId,
        game: &GameConfig,
    ) -> Result<Player, GameError> {
        let player = roll_initial_player(id, name, room, game);
        self.insert(player.clone())?;
        Ok(player)
    }

    /// Store a prepared record; fails if the id is already taken.
    pub fn insert(&self, player: Player) -> Result<(), GameError> {
        match self.players.entry(player.id) {
            Entry::Occupied(_) => Err(GameError::DuplicateConnection),
            Entry::Vacant(slot) => {
                slot.insert(player);
                Ok(())
            }
        }
    }

    /// Snapshot of a single record.
    pub fn get(&self, id: &PlayerId) -> Result<Player, GameError> {
        self.players
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(GameError::NotFound)
    }

    /// Apply `f` to the record under its entry lock.
    ///
    /// Never call this from inside another `mutate`/`get` on the same
    /// registry: two guards on one shard deadlock.
    pub fn mutate<F, R>(&self, id: &PlayerId, f: F) -> Result<R, GameError>
    where
        F: FnOnce(&mut Player) -> R,
    {
        let mut entry = self.players.get_mut(id).ok_or(GameError::NotFound)?;
        Ok(f(entry.value_mut()))
    }

    /// Remove the record. Returns the removed record, `None` if it was already gone.
    pub fn remove(&self, id: &PlayerId) -> Option<Player> {
        self.players.remove(id).map(|(_, player)| player)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// Records for `ids` in the given order; ids without a record are skipped.
    pub fn snapshot(&self, ids: &[PlayerId]) -> Vec<Player> {
        ids.iter()
            .filter_map(|id| self.players.get(id).map(|entry| entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
