use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::GameError;
use crate::protocol::{PlayerId, RoomId};

/// Result of a successful [`RoomRegistry::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The room did not exist and was created with this member.
    Created,
    /// The member was added to an existing room.
    Joined,
}

/// Result of [`RoomRegistry::leave`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Room unknown or id was not a member.
    NotMember,
    /// Member removed; `remaining` members are left.
    Left { remaining: usize },
    /// Member removed and the room, now empty, was deleted.
    RoomDeleted,
}

/// Room membership, in join order, with a fixed capacity.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Vec<PlayerId>>,
    max_players: usize,
}

impl RoomRegistry {
    pub fn new(max_players: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            max_players,
        }
    }

    pub const fn max_players(&self) -> usize {
        self.max_players
    }

    /// Add `player_id` to `room_id`, creating the room on first join.
    ///
    /// Joining a room the id already belongs to is a no-op.
    pub fn join(&self, room_id: &str, player_id: PlayerId) -> Result<JoinOutcome, GameError> {
        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(mut room) => {
                let members = room.get_mut();
                if members.contains(&player_id) {
                    return Ok(JoinOutcome::Joined);
                }
                if members.len() >= self.max_players {
                    return Err(GameError::RoomFull {
                        max_players: self.max_players,
                    });
                }
                members.push(player_id);
                Ok(JoinOutcome::Joined)
            }
            Entry::Vacant(slot) => {
                if self.max_players == 0 {
                    return Err(GameError::RoomFull { max_players: 0 });
                }
                slot.insert(vec![player_id]);
                Ok(JoinOutcome::Created)
            }
        }
    }

    /// Remove `player_id`; the room is deleted once empty.
    pub fn leave(&self, room_id: &str, player_id: &PlayerId) -> LeaveOutcome {
        let remaining = {
            let Some(mut members) = self.rooms.get_mut(room_id) else {
                return LeaveOutcome::NotMember;
            };
            let Some(index) = members.iter().position(|id| id == player_id) else {
                return LeaveOutcome::NotMember;
            };
            members.remove(index);
            members.len()
        };

        if remaining == 0 && self.rooms.remove_if(room_id, |_, members| members.is_empty()).is_some() {
            return LeaveOutcome::RoomDeleted;
        }
        LeaveOutcome::Left { remaining }
    }

    /// Current members in join order; empty for unknown rooms.
    pub fn members(&self, room_id: &str) -> Vec<PlayerId> {
        self.rooms
            .get(room_id)
            .map(|members| members.value().clone())
            .unwrap_or_default()
    }

    pub fn is_member(&self, room_id: &str, player_id: &PlayerId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.contains(player_id))
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |members| members.len())
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
