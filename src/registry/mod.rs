//! Authoritative in-memory state: player records, room membership and the
//! per-room locks that serialize multi-record updates.

mod player_registry;
mod room_locks;
mod room_registry;

pub use player_registry::{roll_initial_player, PlayerRegistry};
pub use room_locks::RoomLocks;
pub use room_registry::{JoinOutcome, LeaveOutcome, RoomRegistry};
