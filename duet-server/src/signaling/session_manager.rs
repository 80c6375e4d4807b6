use crate::connection::{Connection, ConnectionRegistry};
use crate::error::SignalingError;
use crate::room::{Admission, RoomRegistry};
use crate::signaling::cleanup::{CleanupRequest, CleanupWorker};
use dashmap::mapref::entry::Entry;
use duet_core::{CallId, ConnectionId, SignalMessage};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub(crate) struct SessionInner {
    rooms: RoomRegistry,
    connections: ConnectionRegistry,
    cleanup_tx: mpsc::UnboundedSender<CleanupRequest>,
}

/// Join, leave, hangup and relay transitions over both registries.
///
/// Lock order is always rooms, then connections. A failed write to a peer is
/// never handled inline; it becomes a [`CleanupRequest`] processed by a
/// background worker after the current room lock is released.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    /// Create the manager and spawn its cleanup worker on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new() -> Self {
        let (cleanup_tx, cleanup_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(SessionInner {
            rooms: RoomRegistry::new(),
            connections: ConnectionRegistry::new(),
            cleanup_tx,
        });

        let worker = CleanupWorker::new(Arc::downgrade(&inner), cleanup_rx);
        tokio::spawn(worker.run());

        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    pub fn register(&self, connection: Connection) {
        info!("Client connected: {} ({})", connection.remote(), connection.id());
        self.inner.connections.register(connection);
    }

    /// Transport closed: leave the current call, then forget the connection.
    pub fn disconnect(&self, id: &ConnectionId) {
        if let Some(call_id) = self.inner.connections.get_call_id(id) {
            self.leave_call(id, &call_id);
        }
        if let Some(connection) = self.inner.connections.unregister(id) {
            info!("Client disconnected: {}", connection.remote());
        }
    }

    pub fn offer(
        &self,
        sender: &Connection,
        call_id: CallId,
        data: Value,
    ) -> Result<(), SignalingError> {
        let offer = SignalMessage::Offer {
            call_id: call_id.clone(),
            data,
        };

        if let Err(e) = self.leave_other_call(sender, &call_id, false) {
            if let Ok(mut room) = self.inner.rooms.get(&call_id) {
                room.set_cached_offer(offer);
            }
            return Err(e);
        }

        let failed = {
            let mut room = self.inner.rooms.get_or_create(&call_id);
            // The latest offer is cached even when the sender is turned away.
            room.set_cached_offer(offer.clone());
            if let Err(e) = room.add_member(sender) {
                warn!(
                    "Room {} full, rejecting offer from {}",
                    call_id,
                    sender.remote()
                );
                return Err(e);
            }
            self.inner
                .connections
                .set_call_id(&sender.id(), call_id.clone());
            debug!("Stored offer for {} from {}", call_id, sender.remote());

            room.relay(Some(&sender.id()), &offer)
        };

        self.schedule_cleanup(&call_id, failed);
        Ok(())
    }

    pub fn answer(
        &self,
        sender: &Connection,
        call_id: CallId,
        data: Value,
    ) -> Result<(), SignalingError> {
        self.leave_other_call(sender, &call_id, true)?;

        let answer = SignalMessage::Answer {
            call_id: call_id.clone(),
            data,
        };

        let failed = {
            let mut room = self.inner.rooms.get(&call_id).inspect_err(|_| {
                warn!(
                    "Room {} not found for answer from {}",
                    call_id,
                    sender.remote()
                )
            })?;
            if let Err(e) = room.add_member(sender) {
                warn!(
                    "Room {} full, rejecting answer from {}",
                    call_id,
                    sender.remote()
                );
                return Err(e);
            }
            self.inner
                .connections
                .set_call_id(&sender.id(), call_id.clone());

            room.relay(Some(&sender.id()), &answer)
        };

        self.schedule_cleanup(&call_id, failed);
        Ok(())
    }

    /// Relay a candidate to whoever is in the room. Membership is not checked
    /// or changed.
    pub fn ice_candidate(
        &self,
        sender: &Connection,
        call_id: CallId,
        data: Value,
    ) -> Result<(), SignalingError> {
        let candidate = SignalMessage::IceCandidate {
            call_id: call_id.clone(),
            data,
        };

        let failed = {
            let room = self.inner.rooms.get(&call_id).inspect_err(|_| {
                warn!(
                    "Room {} not found for ICE candidate from {}",
                    call_id,
                    sender.remote()
                )
            })?;
            room.relay(Some(&sender.id()), &candidate)
        };

        self.schedule_cleanup(&call_id, failed);
        Ok(())
    }

    pub fn join_call(&self, sender: &Connection, call_id: CallId) -> Result<(), SignalingError> {
        self.leave_other_call(sender, &call_id, false)?;

        let mut room = self.inner.rooms.get_or_create(&call_id);
        match room.add_member(sender) {
            Ok(Admission::AlreadyMember) => {
                info!(
                    "Client {} already in room {}, ignoring",
                    sender.remote(),
                    call_id
                );
                return Ok(());
            }
            Ok(Admission::Joined) => {}
            Err(e) => {
                warn!(
                    "Room {} full, rejecting join from {}",
                    call_id,
                    sender.remote()
                );
                return Err(e);
            }
        }
        self.inner
            .connections
            .set_call_id(&sender.id(), call_id.clone());
        info!(
            "Client {} joined {} (size: {})",
            sender.remote(),
            call_id,
            room.len()
        );

        let reply = match room.cached_offer() {
            Some(offer) => {
                debug!("Sending stored offer for {} to {}", call_id, sender.remote());
                offer.clone()
            }
            None => SignalMessage::CallJoined {
                call_id: call_id.clone(),
            },
        };
        let delivered = sender.send(reply);
        drop(room);

        if let Err(e) = delivered {
            error!("Error replying to {} for {}: {}", sender.remote(), call_id, e);
            self.schedule_cleanup(&call_id, vec![sender.id()]);
        }
        Ok(())
    }

    /// End the call for everyone. Unknown calls are silently ignored.
    pub fn hangup(&self, sender: &Connection, call_id: CallId) {
        let Entry::Occupied(entry) = self.inner.rooms.entry(&call_id) else {
            info!(
                "Room {} not found for hangup by {}",
                call_id,
                sender.remote()
            );
            return;
        };

        let room = entry.get();
        let notice = SignalMessage::PeerDisconnected {
            call_id: call_id.clone(),
        };
        // Everyone is unassigned below, so failed peers need no further cleanup.
        room.relay(Some(&sender.id()), &notice);
        for member in room.members() {
            self.inner.connections.clear_call_id(&member.id(), &call_id);
        }

        entry.remove();
        info!("Deleted room {} on hangup by {}", call_id, sender.remote());
    }

    /// Remove `id` from `call_id`, deleting the room if it empties and
    /// notifying the remaining member otherwise.
    ///
    /// Shared by transport close and failed-write recovery. A connection that
    /// is no longer in that room is left alone.
    pub fn leave_call(&self, id: &ConnectionId, call_id: &CallId) {
        let failed = match self.inner.rooms.entry(call_id) {
            Entry::Vacant(_) => {
                self.inner.connections.clear_call_id(id, call_id);
                return;
            }
            Entry::Occupied(mut entry) => {
                if entry.get_mut().remove_member(id).is_none() {
                    return;
                }
                self.inner.connections.clear_call_id(id, call_id);

                if entry.get().is_empty() {
                    entry.remove();
                    info!("Deleted empty room {}", call_id);
                    return;
                }

                let notice = SignalMessage::PeerDisconnected {
                    call_id: call_id.clone(),
                };
                entry.get().relay(None, &notice)
            }
        };

        self.schedule_cleanup(call_id, failed);
    }

    pub fn call_id_of(&self, id: &ConnectionId) -> Option<CallId> {
        self.inner.connections.get_call_id(id)
    }

    pub fn room_members(&self, call_id: &CallId) -> Option<Vec<ConnectionId>> {
        self.inner.rooms.members(call_id)
    }

    pub fn room_exists(&self, call_id: &CallId) -> bool {
        self.inner.rooms.contains(call_id)
    }

    pub fn is_registered(&self, id: &ConnectionId) -> bool {
        self.inner.connections.contains(id)
    }

    pub fn room_count(&self) -> usize {
        self.inner.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    /// Leave the current call when `sender` moves to a different one.
    ///
    /// The target is checked first, without holding its lock while the old
    /// room is touched: a request that would be rejected leaves the current
    /// call alone. `require_room` is set for requests that cannot create it.
    fn leave_other_call(
        &self,
        sender: &Connection,
        call_id: &CallId,
        require_room: bool,
    ) -> Result<(), SignalingError> {
        let Some(current) = self.inner.connections.get_call_id(&sender.id()) else {
            return Ok(());
        };
        if &current == call_id {
            return Ok(());
        }

        let admissible = match self.inner.rooms.get(call_id) {
            Ok(room) if room.is_full() && !room.is_member(&sender.id()) => {
                Err(SignalingError::RoomFull)
            }
            Ok(_) => Ok(()),
            Err(e) if require_room => Err(e),
            Err(_) => Ok(()),
        };
        if let Err(e) = admissible {
            warn!(
                "Client {} cannot switch from {} to {}: {}",
                sender.remote(),
                current,
                call_id,
                e
            );
            return Err(e);
        }

        info!(
            "Client {} switching from {} to {}",
            sender.remote(),
            current,
            call_id
        );
        self.leave_call(&sender.id(), &current);
        Ok(())
    }

    fn schedule_cleanup(&self, call_id: &CallId, failed: Vec<ConnectionId>) {
        for connection in failed {
            let request = CleanupRequest {
                connection,
                call_id: call_id.clone(),
            };
            if self.inner.cleanup_tx.send(request).is_err() {
                error!("Cleanup worker is gone, {} stays in {}", connection, call_id);
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
