use crate::connection::Connection;
use dashmap::DashMap;
use duet_core::{CallId, ConnectionId};
use tracing::debug;

struct ConnectionEntry {
    connection: Connection,
    call_id: Option<CallId>,
}

/// Every live connection and the call it is currently assigned to.
///
/// Each method is a single atomic step. Callers that also touch the room
/// registry must lock the room first.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection: Connection) {
        self.connections.insert(
            connection.id(),
            ConnectionEntry {
                connection,
                call_id: None,
            },
        );
    }

    /// Forget a connection. Unknown ids are ignored.
    pub fn unregister(&self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id).map(|(_, entry)| entry.connection)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<Connection> {
        self.connections
            .get(id)
            .map(|entry| entry.connection.clone())
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn set_call_id(&self, id: &ConnectionId, call_id: CallId) {
        match self.connections.get_mut(id) {
            Some(mut entry) => entry.call_id = Some(call_id),
            None => debug!("Ignoring call assignment for unregistered connection {}", id),
        }
    }

    /// Unassign `id`, but only while it is still assigned to `call_id`.
    ///
    /// Returns whether an assignment was cleared.
    pub fn clear_call_id(&self, id: &ConnectionId, call_id: &CallId) -> bool {
        let Some(mut entry) = self.connections.get_mut(id) else {
            return false;
        };
        if entry.call_id.as_ref() != Some(call_id) {
            return false;
        }
        entry.call_id = None;
        true
    }

    pub fn get_call_id(&self, id: &ConnectionId) -> Option<CallId> {
        self.connections
            .get(id)
            .and_then(|entry| entry.call_id.clone())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
