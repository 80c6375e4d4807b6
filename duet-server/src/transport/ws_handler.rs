use crate::connection::Connection;
use crate::signaling::MessageRouter;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    State(router): State<MessageRouter>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, remote, router))
}

/// One worker per connection: frames are routed one at a time, in order.
async fn handle_socket(socket: WebSocket, remote: SocketAddr, router: MessageRouter) {
    let (mut sender, mut receiver) = socket.split();
    let (connection, mut outbound) = Connection::channel(remote);
    let connection_id = connection.id();

    router.sessions().register(connection.clone());

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize signal message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                warn!("Failed to write to {}: {}", remote, e);
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let router = router.clone();

        async move {
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => router.route_text(&connection, text.as_str()),
                    Ok(Message::Close(frame)) => {
                        match frame {
                            Some(frame) => info!(
                                "Client {} closed connection normally (code {})",
                                remote, frame.code
                            ),
                            None => info!("Client {} closed connection normally", remote),
                        }
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Client {} closed connection abnormally: {}", remote, e);
                        break;
                    }
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    router.sessions().disconnect(&connection_id);
}
