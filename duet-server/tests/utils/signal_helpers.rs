use duet_core::{CallId, SignalMessage};
use serde_json::{Value, json};

/// Timeout for a single expected message (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// How long to wait before asserting nothing else arrived (ms).
pub const SILENCE_MS: u64 = 50;

pub fn offer(call_id: &str, sdp: &str) -> Value {
    json!({"type": "offer", "callId": call_id, "data": {"type": "offer", "sdp": sdp}})
}

pub fn answer(call_id: &str, sdp: &str) -> Value {
    json!({"type": "answer", "callId": call_id, "data": {"type": "answer", "sdp": sdp}})
}

pub fn ice_candidate(call_id: &str, candidate: &str) -> Value {
    json!({
        "type": "ice-candidate",
        "callId": call_id,
        "data": {"candidate": candidate, "sdpMid": "0", "sdpMLineIndex": 0}
    })
}

pub fn join_call(call_id: &str) -> Value {
    json!({"type": "join_call", "callId": call_id})
}

pub fn hangup(call_id: &str) -> Value {
    json!({"type": "hangup", "callId": call_id})
}

/// The message a peer should receive when `msg` is relayed to it.
pub fn relayed(msg: &Value) -> SignalMessage {
    serde_json::from_value(msg.clone()).expect("relayable message")
}

pub fn error_for(call_id: &str, text: &str) -> SignalMessage {
    SignalMessage::error(CallId::from(call_id), text)
}

pub fn peer_disconnected(call_id: &str) -> SignalMessage {
    SignalMessage::PeerDisconnected {
        call_id: CallId::from(call_id),
    }
}

pub fn call_joined(call_id: &str) -> SignalMessage {
    SignalMessage::CallJoined {
        call_id: CallId::from(call_id),
    }
}

/// Poll `condition` until it holds or `timeout_ms` passes.
pub async fn wait_until<F>(mut condition: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    condition()
}
