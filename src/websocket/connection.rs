use crate::error::GameError;
use crate::protocol::{ErrorCode, ServerMessage};
use crate::server::{RegisterClientError, SessionCoordinator};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::parsing::parse_client_message;
use super::sending::{send_immediate_server_message, send_text_message};

pub(super) async fn handle_socket(
    socket: WebSocket,
    server: Arc<SessionCoordinator>,
    addr: SocketAddr,
) {
    let (mut sender, mut receiver) = socket.split();
    let queue_capacity = server.config().websocket_config.outbound_queue_capacity.max(1);
    let (tx, mut rx) = mpsc::channel::<Arc<ServerMessage>>(queue_capacity);
    let greeting_tx = tx.clone();

    // Register client with server
    let player_id = match server.register_client(tx, addr).await {
        Ok(player_id) => {
            tracing::info!(%player_id, client_addr = %addr, "WebSocket connection established");
            player_id
        }
        Err(err @ RegisterClientError::IpLimitExceeded { .. }) => {
            let error_message = ServerMessage::Error {
                message: err.to_string(),
                error_code: Some(ErrorCode::TooManyConnections),
            };
            if let Err(err) = send_immediate_server_message(&mut sender, &error_message).await {
                tracing::debug!(
                    client_addr = %addr,
                    error = %err,
                    "Failed to send IP limit error frame"
                );
            }
            let _ = sender.close().await;
            return;
        }
    };

    // First frame tells the client its own id
    if greeting_tx
        .try_send(Arc::new(ServerMessage::Connected { player_id }))
        .is_err()
    {
        tracing::warn!(%player_id, "Failed to enqueue connected frame");
    }
    drop(greeting_tx);

    // Spawn task to handle outgoing messages
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if send_text_message(&mut sender, &message, &player_id)
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Handle incoming messages
    let server_clone = server.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    server_clone.metrics().increment_websocket_errors();
                    tracing::warn!(%player_id, "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Check message size limit
                    let max_size = server_clone.config().max_message_size;
                    if text.len() > max_size {
                        tracing::warn!(
                            %player_id,
                            size = text.len(),
                            max = max_size,
                            "Message exceeds size limit"
                        );
                        let error = GameError::MessageTooLarge {
                            size: text.len(),
                            max: max_size,
                        };
                        server_clone.send_game_error(&player_id, &error).await;
                        continue;
                    }

                    match parse_client_message(text.as_str()) {
                        Ok(client_message) => {
                            server_clone
                                .handle_client_message(&player_id, client_message)
                                .await;
                        }
                        Err(rejection) => {
                            tracing::warn!(
                                %player_id,
                                error = ?rejection,
                                "Rejected client WebSocket frame"
                            );
                            let error = GameError::from(rejection);
                            server_clone.send_game_error(&player_id, &error).await;
                        }
                    }
                }
                Message::Binary(_) => {
                    tracing::debug!(%player_id, "Binary frame rejected");
                    let error = GameError::UnsupportedMessage("binary frame".to_string());
                    server_clone.send_game_error(&player_id, &error).await;
                }
                Message::Close(_) => {
                    tracing::info!(%player_id, "WebSocket connection closed");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    // Wait for either task to complete, then stop the other
    let send_finished = tokio::select! {
        _ = &mut send_task => {
            tracing::debug!(%player_id, "Send task completed");
            receive_task.abort();
            true
        }
        _ = &mut receive_task => {
            tracing::debug!(%player_id, "Receive task completed");
            false
        }
    };

    server.unregister_client(&player_id).await;
    if !send_finished {
        // Unregistering dropped the last queue sender, so the write task drains and exits
        let _ = send_task.await;
    }
}
