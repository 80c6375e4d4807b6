use crate::error::SignalingError;
use duet_core::{ConnectionId, SignalMessage};
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Handle to one client's outbound message channel.
///
/// Cloning is cheap; every clone writes into the same channel. The transport
/// owns the receiving half and turns each message into a frame.
#[derive(Clone, Debug)]
pub struct Connection {
    id: ConnectionId,
    remote: SocketAddr,
    tx: mpsc::UnboundedSender<SignalMessage>,
}

impl Connection {
    pub fn new(remote: SocketAddr, tx: mpsc::UnboundedSender<SignalMessage>) -> Self {
        Self {
            id: ConnectionId::new(),
            remote,
            tx,
        }
    }

    /// Create a connection together with the receiver its messages land in.
    pub fn channel(remote: SocketAddr) -> (Self, mpsc::UnboundedReceiver<SignalMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(remote, tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Queue a message for this connection.
    ///
    /// Fails only when the transport side has gone away.
    pub fn send(&self, msg: SignalMessage) -> Result<(), SignalingError> {
        self.tx
            .send(msg)
            .map_err(|_| SignalingError::Delivery(self.id))
    }
}
