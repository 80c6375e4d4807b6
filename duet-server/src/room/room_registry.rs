use crate::error::SignalingError;
use crate::room::Room;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use duet_core::{CallId, ConnectionId};
use tracing::info;

/// Active rooms keyed by call identifier.
///
/// A `RefMut` or `Entry` returned from here holds the room's lock until it is
/// dropped. Never call back into the registry while holding one.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<CallId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the room for `call_id`, creating it if it does not exist.
    ///
    /// A new room is empty; the caller must admit its first member before
    /// releasing the lock.
    pub fn get_or_create(&self, call_id: &CallId) -> RefMut<'_, CallId, Room> {
        match self.rooms.entry(call_id.clone()) {
            Entry::Occupied(entry) => entry.into_ref(),
            Entry::Vacant(entry) => {
                info!("Created room {}", call_id);
                entry.insert(Room::new())
            }
        }
    }

    pub fn get(&self, call_id: &CallId) -> Result<RefMut<'_, CallId, Room>, SignalingError> {
        self.rooms
            .get_mut(call_id)
            .ok_or(SignalingError::RoomNotFound)
    }

    /// Lock the slot for `call_id` whether or not a room exists there.
    pub fn entry(&self, call_id: &CallId) -> Entry<'_, CallId, Room> {
        self.rooms.entry(call_id.clone())
    }

    pub fn delete(&self, call_id: &CallId) -> Option<Room> {
        let removed = self.rooms.remove(call_id).map(|(_, room)| room);
        if removed.is_some() {
            info!("Deleted room {}", call_id);
        }
        removed
    }

    pub fn contains(&self, call_id: &CallId) -> bool {
        self.rooms.contains_key(call_id)
    }

    pub fn members(&self, call_id: &CallId) -> Option<Vec<ConnectionId>> {
        self.rooms.get(call_id).map(|room| room.member_ids())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
