use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::protocol::RoomId;

/// One async mutex per room.
///
/// Holding a room's guard gives exclusive write access to that room's
/// membership and to the player records of its members. Tasks never hold
/// two room guards at once.
#[derive(Debug, Default)]
pub struct RoomLocks {
    locks: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `room_id`.
    pub async fn lock(&self, room_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is released before awaiting
        let mutex = self
            .locks
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        mutex.lock_owned().await
    }

    /// Drop the lock entry if nobody holds or waits on it.
    ///
    /// Call after the room's guard has been released.
    pub fn prune(&self, room_id: &str) {
        self.locks
            .remove_if(room_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
