use super::*;
use crate::error::GameError;
use crate::protocol::{ClientMessage, ErrorCode, ServerMessage};
use tokio::sync::mpsc;

fn create_test_server() -> Arc<SessionCoordinator> {
    SessionCoordinator::new(ServerConfig::default())
}

async fn connect(
    server: &SessionCoordinator,
) -> (PlayerId, mpsc::Receiver<Arc<ServerMessage>>) {
    let (sender, receiver) = mpsc::channel(32);
    let player_id = Uuid::new_v4();
    server.connect_client(player_id, sender).await;
    (player_id, receiver)
}

async fn join(server: &SessionCoordinator, player_id: &PlayerId, name: &str, room: &str) {
    server
        .handle_client_message(
            player_id,
            ClientMessage::JoinRoom {
                name: name.to_string(),
                room_id: room.to_string(),
            },
        )
        .await;
}

fn drain(receiver: &mut mpsc::Receiver<Arc<ServerMessage>>) -> Vec<Arc<ServerMessage>> {
    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    messages
}

fn expect_error(receiver: &mut mpsc::Receiver<Arc<ServerMessage>>) -> (String, ErrorCode) {
    let messages = drain(receiver);
    assert_eq!(messages.len(), 1, "expected a single error, got {messages:?}");
    match messages[0].as_ref() {
        ServerMessage::Error {
            message,
            error_code: Some(code),
        } => (message.clone(), *code),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn both_players_receive_two_player_roster() {
    let server = create_test_server();
    let (alice, mut alice_rx) = connect(&server).await;
    let (bob, mut bob_rx) = connect(&server).await;

    join(&server, &alice, "Alice", "ABCD").await;
    let first = drain(&mut alice_rx);
    assert_eq!(first.len(), 1);
    let ServerMessage::PlayerJoined(payload) = first[0].as_ref() else {
        panic!("expected playerJoined");
    };
    assert_eq!(payload.player.id, alice);
    assert_eq!(payload.players.len(), 1);

    join(&server, &bob, "Bob", "ABCD").await;
    for receiver in [&mut alice_rx, &mut bob_rx] {
        let messages = drain(receiver);
        assert_eq!(messages.len(), 1);
        let ServerMessage::PlayerJoined(payload) = messages[0].as_ref() else {
            panic!("expected playerJoined");
        };
        assert_eq!(payload.player.name, "Bob");
        let roster: Vec<_> = payload.players.iter().map(|p| p.id).collect();
        assert_eq!(roster, vec![alice, bob]);
    }
}

#[tokio::test]
async fn joined_player_gets_rolled_inventory_and_spawn() {
    let server = create_test_server();
    let (alice, _rx) = connect(&server).await;
    join(&server, &alice, "  Alice  ", "abcd").await;

    let player = server.player(&alice).expect("record created");
    assert_eq!(player.name, "Alice");
    assert_eq!(player.room, "ABCD");
    assert!((1..=3).contains(&player.inventory.guns));
    assert!((5..=14).contains(&player.inventory.ammo));
    assert!((0.0..800.0).contains(&player.position.x));
    assert!((0.0..600.0).contains(&player.position.y));
    assert_eq!(server.get_client_room(&alice).as_deref(), Some("ABCD"));
}

#[tokio::test]
async fn seventh_join_is_rejected_and_room_is_unchanged() {
    let server = create_test_server();
    let mut receivers = Vec::new();
    for i in 0..6 {
        let (id, rx) = connect(&server).await;
        join(&server, &id, &format!("P{i}"), "FULL").await;
        receivers.push(rx);
    }
    for rx in receivers.iter_mut() {
        drain(rx);
    }
    let before = server.room_members("FULL");

    let (late, mut late_rx) = connect(&server).await;
    join(&server, &late, "Late", "full").await;

    let (message, code) = expect_error(&mut late_rx);
    assert_eq!(code, ErrorCode::RoomFull);
    assert_eq!(message, "Room is full! Maximum 6 players allowed.");
    assert_eq!(server.room_members("FULL"), before);
    assert!(server.player(&late).is_none());
    assert!(server.get_client_room(&late).is_none());
    for rx in receivers.iter_mut() {
        assert!(drain(rx).is_empty(), "members see nothing for a rejected join");
    }

    // still Connected, so another room works
    join(&server, &late, "Late", "OTHER").await;
    assert_eq!(server.get_client_room(&late).as_deref(), Some("OTHER"));
}

#[tokio::test]
async fn second_join_on_same_connection_is_duplicate() {
    let server = create_test_server();
    let (alice, mut rx) = connect(&server).await;
    join(&server, &alice, "Alice", "ONE").await;
    drain(&mut rx);

    join(&server, &alice, "Alice", "TWO").await;
    let (message, code) = expect_error(&mut rx);
    assert_eq!(code, ErrorCode::DuplicateConnection);
    assert_eq!(message, "Already in a room");
    assert_eq!(server.room_count(), 1);
}

#[tokio::test]
async fn invalid_name_and_room_are_validation_errors() {
    let server = create_test_server();
    let (alice, mut rx) = connect(&server).await;

    join(&server, &alice, "   ", "ABCD").await;
    let (message, code) = expect_error(&mut rx);
    assert_eq!(code, ErrorCode::ValidationError);
    assert_eq!(message, "Please enter your name");

    join(&server, &alice, &"x".repeat(21), "ABCD").await;
    let (message, _) = expect_error(&mut rx);
    assert_eq!(message, "Name too long (max 20 characters)");

    join(&server, &alice, "Alice", "  ").await;
    let (message, _) = expect_error(&mut rx);
    assert_eq!(message, "Please enter a room ID");

    assert_eq!(server.room_count(), 0);
    assert_eq!(server.metrics.snapshot(0).await.errors.validation_errors, 3);
}

#[tokio::test]
async fn join_attempts_are_rate_limited() {
    let mut config = ServerConfig::default();
    config.rate_limit_config.max_join_attempts = 2;
    let server = SessionCoordinator::new(config);
    let (alice, mut rx) = connect(&server).await;

    join(&server, &alice, "", "ABCD").await;
    join(&server, &alice, "", "ABCD").await;
    drain(&mut rx);

    join(&server, &alice, "Alice", "ABCD").await;
    let (_, code) = expect_error(&mut rx);
    assert_eq!(code, ErrorCode::RateLimitExceeded);
    assert!(server.get_client_room(&alice).is_none());
}

#[tokio::test]
async fn disconnect_notifies_remaining_and_deletes_empty_room() {
    let server = create_test_server();
    let (alice, mut alice_rx) = connect(&server).await;
    let (bob, mut bob_rx) = connect(&server).await;
    join(&server, &alice, "Alice", "ABCD").await;
    join(&server, &bob, "Bob", "ABCD").await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    server.disconnect_client(&bob).await;
    let messages = drain(&mut alice_rx);
    assert_eq!(messages.len(), 1);
    match messages[0].as_ref() {
        ServerMessage::PlayerLeft {
            player_id,
            player_name,
        } => {
            assert_eq!(*player_id, bob);
            assert_eq!(player_name, "Bob");
        }
        other => panic!("expected playerLeft, got {other:?}"),
    }
    assert_eq!(server.room_members("ABCD"), vec![alice]);
    assert!(server.player(&bob).is_none());

    server.disconnect_client(&alice).await;
    assert_eq!(server.room_count(), 0);
    assert_eq!(server.player_count(), 0);
    assert_eq!(server.room_lock_count(), 0);

    let (carol, mut carol_rx) = connect(&server).await;
    join(&server, &carol, "Carol", "abcd").await;
    let messages = drain(&mut carol_rx);
    let ServerMessage::PlayerJoined(payload) = messages[0].as_ref() else {
        panic!("expected playerJoined");
    };
    assert_eq!(payload.players.len(), 1, "fresh room after deletion");
}

#[tokio::test]
async fn double_disconnect_is_silent_and_leaves_other_rooms_alone() {
    let server = create_test_server();
    let (alice, _alice_rx) = connect(&server).await;
    let (bob, mut bob_rx) = connect(&server).await;
    let (carol, mut carol_rx) = connect(&server).await;
    join(&server, &alice, "Alice", "ONE").await;
    join(&server, &bob, "Bob", "ONE").await;
    join(&server, &carol, "Carol", "TWO").await;
    drain(&mut bob_rx);
    drain(&mut carol_rx);

    server.disconnect_client(&alice).await;
    server.disconnect_client(&alice).await;

    assert_eq!(drain(&mut bob_rx).len(), 1, "one playerLeft only");
    assert!(drain(&mut carol_rx).is_empty());
    assert_eq!(server.room_members("TWO"), vec![carol]);
    assert_eq!(server.room_members("ONE"), vec![bob]);

    let snapshot = server.metrics.snapshot(server.room_count()).await;
    assert_eq!(snapshot.connections.active_connections, 2);
}

#[tokio::test]
async fn disconnect_without_room_is_noop() {
    let server = create_test_server();
    let (alice, _rx) = connect(&server).await;
    server.disconnect_client(&alice).await;
    assert!(!server.is_connected(&alice));
    assert_eq!(server.room_count(), 0);
}

#[tokio::test]
async fn disconnect_while_join_waits_on_room_rolls_join_back() {
    let server = create_test_server();
    let (alice, _alice_rx) = connect(&server).await;

    // Hold the room so the join parks after its preconditions pass
    let guard = server.room_locks.lock("ABCD").await;
    let joining = {
        let server = server.clone();
        tokio::spawn(async move {
            server
                .handle_join_room(&alice, "Alice".to_string(), "ABCD".to_string())
                .await
        })
    };
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    server.disconnect_client(&alice).await;
    drop(guard);

    assert_eq!(joining.await.unwrap(), Err(GameError::NotFound));
    assert!(server.player(&alice).is_none());
    assert_eq!(server.room_count(), 0);
    assert_eq!(server.room_lock_count(), 0);
    assert_eq!(server.rate_limiter.tracked_connections(), 0);
}
