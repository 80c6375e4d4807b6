use duet_core::CallId;

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{TestClient, call_joined, hangup, join_call, offer, peer_disconnected};

#[tokio::test]
async fn test_hangup_ends_call_for_everyone() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);
    let mut b = TestClient::connect(&sessions);

    a.send(&router, offer("X", "sdp-A"));
    b.send(&router, join_call("X"));
    b.recv().await.unwrap();

    a.send(&router, hangup("X"));

    assert_eq!(b.settle().await, vec![peer_disconnected("X")]);
    assert!(a.drain().is_empty());
    assert!(!sessions.room_exists(&CallId::from("X")));
    assert_eq!(sessions.call_id_of(&a.id()), None);
    assert_eq!(sessions.call_id_of(&b.id()), None);
    assert!(sessions.is_registered(&a.id()));
}

#[tokio::test]
async fn test_hangup_unknown_call_is_silent() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);

    a.send(&router, hangup("nope"));

    assert!(a.settle().await.is_empty());
    assert_eq!(sessions.room_count(), 0);
}

#[tokio::test]
async fn test_room_after_hangup_starts_fresh() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);
    let mut b = TestClient::connect(&sessions);

    a.send(&router, offer("X", "sdp-A"));
    a.send(&router, hangup("X"));
    b.send(&router, join_call("X"));

    assert_eq!(b.settle().await, vec![call_joined("X")]);
    assert!(a.drain().is_empty());
    assert_eq!(sessions.room_members(&CallId::from("X")), Some(vec![b.id()]));
}

#[tokio::test]
async fn test_hangup_by_outsider_tears_down_room() {
    init_tracing();

    let (sessions, router) = create_test_session();
    let mut a = TestClient::connect(&sessions);
    let mut b = TestClient::connect(&sessions);
    let mut outsider = TestClient::connect(&sessions);

    a.send(&router, offer("X", "sdp-A"));
    b.send(&router, join_call("X"));
    b.recv().await.unwrap();

    outsider.send(&router, hangup("X"));

    assert_eq!(a.settle().await, vec![peer_disconnected("X")]);
    assert_eq!(b.drain(), vec![peer_disconnected("X")]);
    assert!(outsider.drain().is_empty());
    assert!(!sessions.room_exists(&CallId::from("X")));
}
