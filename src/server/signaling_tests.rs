use super::*;
use crate::protocol::SignalKind;
use crate::protocol::{ClientMessage, ErrorCode, ServerMessage};
use serde_json::json;
use tokio::sync::mpsc;

type Inbox = mpsc::Receiver<Arc<ServerMessage>>;

async fn connect(server: &SessionCoordinator) -> (PlayerId, Inbox) {
    let (sender, receiver) = mpsc::channel(16);
    let player_id = Uuid::new_v4();
    server.connect_client(player_id, sender).await;
    (player_id, receiver)
}

async fn join(server: &SessionCoordinator, player_id: &PlayerId, name: &str, room: &str) {
    server
        .handle_join_room(player_id, name.to_string(), room.to_string())
        .await
        .unwrap();
}

fn drain(receiver: &mut Inbox) -> Vec<Arc<ServerMessage>> {
    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    messages
}

#[tokio::test]
async fn offer_is_forwarded_to_target_only_with_sender_name() {
    let server = SessionCoordinator::new(ServerConfig::default());
    let (alice, mut alice_rx) = connect(&server).await;
    let (bob, mut bob_rx) = connect(&server).await;
    let (_carol, mut carol_rx) = connect(&server).await;
    join(&server, &alice, "Alice", "ABCD").await;
    join(&server, &bob, "Bob", "ABCD").await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    let sdp = json!({"type": "offer", "sdp": "v=0..."});
    server
        .handle_client_message(
            &alice,
            ClientMessage::VoiceOffer {
                offer: sdp.clone(),
                to: bob.to_string(),
                room: "abcd".to_string(),
            },
        )
        .await;

    let messages = drain(&mut bob_rx);
    assert_eq!(messages.len(), 1);
    match messages[0].as_ref() {
        ServerMessage::VoiceOffer {
            offer,
            from,
            from_name,
        } => {
            assert_eq!(offer, &sdp);
            assert_eq!(*from, alice);
            assert_eq!(from_name.as_deref(), Some("Alice"));
        }
        other => panic!("expected voice-offer, got {other:?}"),
    }
    assert!(drain(&mut alice_rx).is_empty());
    assert!(drain(&mut carol_rx).is_empty());
    assert_eq!(server.metrics.snapshot(1).await.signaling.relayed, 1);
}

#[tokio::test]
async fn signal_to_disconnected_peer_is_dropped_silently() {
    let server = SessionCoordinator::new(ServerConfig::default());
    let (alice, mut alice_rx) = connect(&server).await;
    join(&server, &alice, "Alice", "ABCD").await;
    drain(&mut alice_rx);

    server
        .handle_client_message(
            &alice,
            ClientMessage::VoiceIceCandidate {
                candidate: json!({"candidate": "a=1"}),
                to: Uuid::new_v4().to_string(),
                room: "ABCD".to_string(),
            },
        )
        .await;

    assert!(drain(&mut alice_rx).is_empty(), "no error back to the sender");
    assert_eq!(server.metrics.snapshot(1).await.signaling.dropped, 1);
}

#[tokio::test]
async fn signal_to_malformed_id_is_dropped_silently() {
    let server = SessionCoordinator::new(ServerConfig::default());
    let (alice, mut alice_rx) = connect(&server).await;
    join(&server, &alice, "Alice", "ABCD").await;
    drain(&mut alice_rx);

    server
        .handle_client_message(
            &alice,
            ClientMessage::VoiceOffer {
                offer: json!({"sdp": "v=0"}),
                to: "socket-abc".to_string(),
                room: "ABCD".to_string(),
            },
        )
        .await;

    assert!(drain(&mut alice_rx).is_empty(), "no error back to the sender");
    let snapshot = server.metrics.snapshot(1).await;
    assert_eq!(snapshot.signaling.dropped, 1);
    assert_eq!(snapshot.errors.errors_sent, 0);
}

#[tokio::test]
async fn recipient_outside_room_is_rejected_when_enforced() {
    let server = SessionCoordinator::new(ServerConfig::default());
    let (alice, mut alice_rx) = connect(&server).await;
    let (bob, mut bob_rx) = connect(&server).await;
    join(&server, &alice, "Alice", "ABCD").await;
    join(&server, &bob, "Bob", "OTHER").await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    server
        .handle_client_message(
            &alice,
            ClientMessage::VoiceAnswer {
                answer: json!({"sdp": "x"}),
                to: bob.to_string(),
                room: "ABCD".to_string(),
            },
        )
        .await;

    assert!(drain(&mut bob_rx).is_empty());
    let messages = drain(&mut alice_rx);
    assert!(matches!(
        messages[0].as_ref(),
        ServerMessage::Error {
            error_code: Some(ErrorCode::SameRoomViolation),
            ..
        }
    ));
    assert_eq!(server.metrics.snapshot(2).await.signaling.rejected, 1);
}

#[tokio::test]
async fn blind_forwarding_when_membership_is_not_enforced() {
    let mut config = ServerConfig::default();
    config.signaling.enforce_room_membership = false;
    let server = SessionCoordinator::new(config);
    let (alice, _alice_rx) = connect(&server).await;
    let (bob, mut bob_rx) = connect(&server).await;

    server
        .relay_signal(
            SignalKind::Answer,
            &alice,
            &bob.to_string(),
            "whatever",
            json!({"sdp": "answer"}),
        )
        .await
        .unwrap();

    let messages = drain(&mut bob_rx);
    match messages[0].as_ref() {
        ServerMessage::VoiceAnswer {
            from, from_name, ..
        } => {
            assert_eq!(*from, alice);
            assert!(from_name.is_none(), "sender never joined");
        }
        other => panic!("expected voice-answer, got {other:?}"),
    }
}
