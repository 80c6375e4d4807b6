use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use tokio::sync::mpsc;

use duet_core::{ConnectionId, SignalMessage};
use duet_server::{Connection, MessageRouter, SessionManager};
use serde_json::Value;

use super::signal_helpers::{SIGNAL_TIMEOUT_MS, SILENCE_MS};

static NEXT_PORT: AtomicU16 = AtomicU16::new(40000);

/// A registered connection plus the receiver of everything the broker
/// writes to it.
pub struct TestClient {
    pub connection: Connection,
    outbound: mpsc::UnboundedReceiver<SignalMessage>,
}

impl TestClient {
    /// Register a fresh connection, as the transport does on accept.
    pub fn connect(sessions: &SessionManager) -> Self {
        let port = NEXT_PORT.fetch_add(1, Ordering::Relaxed);
        let (connection, outbound) = Connection::channel(SocketAddr::from(([127, 0, 0, 1], port)));
        sessions.register(connection.clone());

        Self {
            connection,
            outbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Deliver a JSON message as if it arrived on this client's socket.
    pub fn send(&self, router: &MessageRouter, msg: Value) {
        router.route_text(&self.connection, &msg.to_string());
    }

    pub fn send_text(&self, router: &MessageRouter, text: &str) {
        router.route_text(&self.connection, text);
    }

    /// Wait for the next message written to this client.
    pub async fn recv(&mut self) -> Result<SignalMessage> {
        tokio::time::timeout(
            std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS),
            self.outbound.recv(),
        )
        .await
        .context("Timeout waiting for message")?
        .context("Outbound channel closed")
    }

    pub fn try_recv(&mut self) -> Option<SignalMessage> {
        self.outbound.try_recv().ok()
    }

    /// Everything received so far.
    pub fn drain(&mut self) -> Vec<SignalMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = self.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Give background work a moment, then return whatever arrived.
    pub async fn settle(&mut self) -> Vec<SignalMessage> {
        tokio::time::sleep(std::time::Duration::from_millis(SILENCE_MS)).await;
        self.drain()
    }

    /// Make every further write to this client fail, like a dead socket.
    pub fn break_transport(&mut self) {
        self.outbound.close();
    }

    /// Run the transport-closed path for this client.
    pub fn disconnect(&self, sessions: &SessionManager) {
        sessions.disconnect(&self.id());
    }
}
