use crate::connection::Connection;
use crate::error::SignalingError;
use duet_core::{ConnectionId, SignalMessage};
use std::collections::HashMap;
use tracing::{debug, error};

/// Maximum number of members in a call.
pub const ROOM_CAPACITY: usize = 2;

/// Result of a successful [`Room::add_member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Joined,
    AlreadyMember,
}

/// One call session: up to two member connections and the latest offer.
#[derive(Debug, Default)]
pub struct Room {
    members: HashMap<ConnectionId, Connection>,
    cached_offer: Option<SignalMessage>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, connection: &Connection) -> Result<Admission, SignalingError> {
        if self.members.contains_key(&connection.id()) {
            return Ok(Admission::AlreadyMember);
        }
        if self.is_full() {
            return Err(SignalingError::RoomFull);
        }
        self.members.insert(connection.id(), connection.clone());
        Ok(Admission::Joined)
    }

    pub fn remove_member(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.members.remove(id)
    }

    pub fn is_member(&self, id: &ConnectionId) -> bool {
        self.members.contains_key(id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Connection> {
        self.members.values()
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    pub fn set_cached_offer(&mut self, offer: SignalMessage) {
        self.cached_offer = Some(offer);
    }

    pub fn cached_offer(&self) -> Option<&SignalMessage> {
        self.cached_offer.as_ref()
    }

    /// Send `msg` to every member except `skip`.
    ///
    /// A failed write does not stop the broadcast. The ids of members whose
    /// channel is gone are returned so the caller can schedule their removal.
    pub fn relay(&self, skip: Option<&ConnectionId>, msg: &SignalMessage) -> Vec<ConnectionId> {
        let mut failed = Vec::new();

        for member in self.members.values() {
            if Some(&member.id()) == skip {
                continue;
            }
            match member.send(msg.clone()) {
                Ok(()) => debug!(
                    "Sent {} to {} for {}",
                    msg.kind().as_str(),
                    member.remote(),
                    msg.call_id()
                ),
                Err(e) => {
                    error!(
                        "Error sending {} to {}: {}",
                        msg.kind().as_str(),
                        member.remote(),
                        e
                    );
                    failed.push(member.id());
                }
            }
        }

        failed
    }
}
