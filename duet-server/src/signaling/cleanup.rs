use crate::signaling::session_manager::{SessionInner, SessionManager};
use duet_core::{CallId, ConnectionId};
use std::sync::Weak;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A connection that failed a write while a room lock was held and must be
/// removed from `call_id` once that lock is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRequest {
    pub connection: ConnectionId,
    pub call_id: CallId,
}

/// Drains cleanup requests outside of any registry lock.
pub(crate) struct CleanupWorker {
    sessions: Weak<SessionInner>,
    rx: mpsc::UnboundedReceiver<CleanupRequest>,
}

impl CleanupWorker {
    pub(crate) fn new(
        sessions: Weak<SessionInner>,
        rx: mpsc::UnboundedReceiver<CleanupRequest>,
    ) -> Self {
        Self { sessions, rx }
    }

    pub(crate) async fn run(mut self) {
        debug!("Cleanup worker started");

        while let Some(request) = self.rx.recv().await {
            let Some(inner) = self.sessions.upgrade() else {
                break;
            };
            info!(
                "Removing unreachable connection {} from {}",
                request.connection, request.call_id
            );
            SessionManager::from_inner(inner).leave_call(&request.connection, &request.call_id);
        }

        debug!("Cleanup worker finished");
    }
}
