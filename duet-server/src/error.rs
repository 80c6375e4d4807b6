use duet_core::{CallId, ConnectionId, SignalMessage};
use thiserror::Error;

/// Failures raised while validating or routing a signaling message.
///
/// The `Display` text is what the client sees in the `data` field of the
/// `error` reply, so it must stay stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalingError {
    #[error("Missing callId")]
    MissingCallId,

    #[error("Missing callId for join_call")]
    MissingJoinCallId,

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    /// The connection's outbound channel is closed. Never reported to clients.
    #[error("Failed to deliver message to {0}")]
    Delivery(ConnectionId),

    #[error("Invalid message: {0}")]
    Malformed(String),
}

impl SignalingError {
    /// Build the `error` message sent back to the offending connection.
    pub fn to_message(&self, call_id: CallId) -> SignalMessage {
        SignalMessage::error(call_id, self.to_string())
    }
}
