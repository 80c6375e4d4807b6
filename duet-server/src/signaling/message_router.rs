use crate::connection::Connection;
use crate::error::SignalingError;
use crate::signaling::SessionManager;
use duet_core::{CallId, MessageType, RawMessage};
use serde_json::Value;
use tracing::{debug, error, warn};

/// A validated inbound message, ready for the lifecycle manager.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Offer { call_id: CallId, data: Value },
    Answer { call_id: CallId, data: Value },
    IceCandidate { call_id: CallId, data: Value },
    JoinCall { call_id: CallId },
    Hangup { call_id: CallId },
}

impl Request {
    /// Check the discriminator and the required `callId`.
    ///
    /// A missing `callId` is reported before an unknown type; `join_call`
    /// gets its own message.
    pub fn validate(raw: RawMessage) -> Result<Self, SignalingError> {
        let call_id = raw.call_id();
        let kind = MessageType::parse(&raw.kind).filter(MessageType::is_inbound);

        let Some(call_id) = call_id else {
            return Err(match kind {
                Some(MessageType::JoinCall) => SignalingError::MissingJoinCallId,
                _ => SignalingError::MissingCallId,
            });
        };

        let data = raw.data;
        match kind {
            Some(MessageType::Offer) => Ok(Self::Offer { call_id, data }),
            Some(MessageType::Answer) => Ok(Self::Answer { call_id, data }),
            Some(MessageType::IceCandidate) => Ok(Self::IceCandidate { call_id, data }),
            Some(MessageType::JoinCall) => Ok(Self::JoinCall { call_id }),
            Some(MessageType::Hangup) => Ok(Self::Hangup { call_id }),
            _ => Err(SignalingError::UnknownType(raw.kind)),
        }
    }

    pub fn kind(&self) -> MessageType {
        match self {
            Self::Offer { .. } => MessageType::Offer,
            Self::Answer { .. } => MessageType::Answer,
            Self::IceCandidate { .. } => MessageType::IceCandidate,
            Self::JoinCall { .. } => MessageType::JoinCall,
            Self::Hangup { .. } => MessageType::Hangup,
        }
    }

    pub fn call_id(&self) -> &CallId {
        match self {
            Self::Offer { call_id, .. }
            | Self::Answer { call_id, .. }
            | Self::IceCandidate { call_id, .. }
            | Self::JoinCall { call_id }
            | Self::Hangup { call_id } => call_id,
        }
    }
}

/// Validates inbound messages and dispatches them to the [`SessionManager`].
///
/// Callers must route one connection's messages sequentially, in arrival
/// order.
#[derive(Clone)]
pub struct MessageRouter {
    sessions: SessionManager,
}

impl MessageRouter {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Decode a text frame and route it. Undecodable frames get an `error`
    /// reply with an empty `callId`.
    pub fn route_text(&self, sender: &Connection, text: &str) {
        match text.parse::<RawMessage>() {
            Ok(raw) => self.route(sender, raw),
            Err(e) => {
                warn!("Invalid message from {}: {}", sender.remote(), e);
                self.reject(
                    sender,
                    CallId::default(),
                    SignalingError::Malformed(e.to_string()),
                );
            }
        }
    }

    pub fn route(&self, sender: &Connection, raw: RawMessage) {
        let reply_to = raw.call_id().unwrap_or_default();

        let result = Request::validate(raw).and_then(|request| {
            debug!(
                "Received from {}: type={}, callId={}",
                sender.remote(),
                request.kind().as_str(),
                request.call_id()
            );
            self.dispatch(sender, request)
        });

        if let Err(e) = result {
            self.reject(sender, reply_to, e);
        }
    }

    fn dispatch(&self, sender: &Connection, request: Request) -> Result<(), SignalingError> {
        match request {
            Request::Offer { call_id, data } => self.sessions.offer(sender, call_id, data),
            Request::Answer { call_id, data } => self.sessions.answer(sender, call_id, data),
            Request::IceCandidate { call_id, data } => {
                self.sessions.ice_candidate(sender, call_id, data)
            }
            Request::JoinCall { call_id } => self.sessions.join_call(sender, call_id),
            Request::Hangup { call_id } => {
                self.sessions.hangup(sender, call_id);
                Ok(())
            }
        }
    }

    fn reject(&self, sender: &Connection, call_id: CallId, e: SignalingError) {
        match sender.send(e.to_message(call_id)) {
            Ok(()) => debug!("Sent error to {}: {}", sender.remote(), e),
            Err(send_err) => error!(
                "Error sending error to {}: {}",
                sender.remote(),
                send_err
            ),
        }
    }
}
