use serde_json::json;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{TestClient, error_for};

#[tokio::test]
async fn test_missing_call_id() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);

    a.send(&router, json!({"type": "offer", "data": {"sdp": "v=0"}}));
    a.send(&router, json!({"type": "hangup", "callId": ""}));

    assert_eq!(
        a.settle().await,
        vec![error_for("", "Missing callId"), error_for("", "Missing callId")]
    );
    assert_eq!(sessions.room_count(), 0);
}

#[tokio::test]
async fn test_join_call_missing_call_id() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);

    a.send(&router, json!({"type": "join_call"}));

    assert_eq!(
        a.settle().await,
        vec![error_for("", "Missing callId for join_call")]
    );
    assert_eq!(sessions.call_id_of(&a.id()), None);
}

#[tokio::test]
async fn test_unknown_type_is_echoed() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);

    a.send(&router, json!({"type": "renegotiate", "callId": "X"}));
    a.send(&router, json!({"type": "call_joined", "callId": "X"}));

    assert_eq!(
        a.settle().await,
        vec![
            error_for("X", "Unknown message type: renegotiate"),
            error_for("X", "Unknown message type: call_joined"),
        ]
    );
    assert_eq!(sessions.room_count(), 0);
}

#[tokio::test]
async fn test_malformed_json() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);

    a.send_text(&router, "{\"type\": ");

    let messages = a.settle().await;
    assert_eq!(messages.len(), 1);
    match &messages[0] {
        duet_core::SignalMessage::Error { call_id, data } => {
            assert!(call_id.is_empty());
            assert!(data.starts_with("Invalid message: "));
        }
        other => panic!("expected error, got {:?}", other),
    }
}
