use crate::model::call::CallId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Every `type` discriminator the protocol knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Offer,
    Answer,
    IceCandidate,
    JoinCall,
    Hangup,
    Error,
    CallJoined,
    PeerDisconnected,
}

impl MessageType {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "offer" => Self::Offer,
            "answer" => Self::Answer,
            "ice-candidate" => Self::IceCandidate,
            "join_call" => Self::JoinCall,
            "hangup" => Self::Hangup,
            "error" => Self::Error,
            "call_joined" => Self::CallJoined,
            "peer_disconnected" => Self::PeerDisconnected,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::IceCandidate => "ice-candidate",
            Self::JoinCall => "join_call",
            Self::Hangup => "hangup",
            Self::Error => "error",
            Self::CallJoined => "call_joined",
            Self::PeerDisconnected => "peer_disconnected",
        }
    }

    /// Types a client is allowed to send to the broker.
    pub fn is_inbound(&self) -> bool {
        matches!(
            self,
            Self::Offer | Self::Answer | Self::IceCandidate | Self::JoinCall | Self::Hangup
        )
    }
}

/// Inbound envelope exactly as it arrives on the wire, before validation.
///
/// `callId` and `data` may be absent; the discriminator is kept as a raw
/// string so unknown types can be echoed back to the sender.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "callId", default)]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl RawMessage {
    /// The call identifier, with `null` and `""` both treated as missing.
    pub fn call_id(&self) -> Option<CallId> {
        self.call_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(CallId::from)
    }
}

impl FromStr for RawMessage {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

/// Messages the broker writes to a connection.
///
/// Relayed `offer`/`answer`/`ice-candidate` messages keep their `data`
/// untouched; the broker never looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum SignalMessage {
    #[serde(rename = "offer")]
    Offer {
        call_id: CallId,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        data: Value,
    },
    #[serde(rename = "answer")]
    Answer {
        call_id: CallId,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        data: Value,
    },
    #[serde(rename = "ice-candidate")]
    IceCandidate {
        call_id: CallId,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        data: Value,
    },
    #[serde(rename = "call_joined")]
    CallJoined { call_id: CallId },
    #[serde(rename = "peer_disconnected")]
    PeerDisconnected { call_id: CallId },
    #[serde(rename = "error")]
    Error { call_id: CallId, data: String },
}

impl SignalMessage {
    pub fn kind(&self) -> MessageType {
        match self {
            Self::Offer { .. } => MessageType::Offer,
            Self::Answer { .. } => MessageType::Answer,
            Self::IceCandidate { .. } => MessageType::IceCandidate,
            Self::CallJoined { .. } => MessageType::CallJoined,
            Self::PeerDisconnected { .. } => MessageType::PeerDisconnected,
            Self::Error { .. } => MessageType::Error,
        }
    }

    pub fn call_id(&self) -> &CallId {
        match self {
            Self::Offer { call_id, .. }
            | Self::Answer { call_id, .. }
            | Self::IceCandidate { call_id, .. }
            | Self::CallJoined { call_id }
            | Self::PeerDisconnected { call_id }
            | Self::Error { call_id, .. } => call_id,
        }
    }

    pub fn error(call_id: CallId, text: impl Into<String>) -> Self {
        Self::Error {
            call_id,
            data: text.into(),
        }
    }
}
