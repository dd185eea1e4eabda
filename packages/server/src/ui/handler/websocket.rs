//! WebSocket connection handlers.
//!
//! One task per connection reads frames and handles them in arrival order;
//! a second task drains the connection's outbound channel into the socket.
//! When either side ends, the connection leaves all its rooms.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::Session,
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::{Outcome, SessionError},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let mut session = match state.connect_usecase.execute(tx).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to register connection: {}", e);
            return;
        }
    };
    let mut send_task = pusher_loop(rx, sender);

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch(&state, &mut session, text.as_str()).await,
                Some(Ok(Message::Close(_))) => {
                    tracing::info!("Connection '{}' requested close", session.connection_id());
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on '{}': {}", session.connection_id(), e);
                    break;
                }
                None => break,
            },
            _ = &mut send_task => break,
        }
    }

    state.leave_rooms_usecase.disconnecting(&mut session).await;
    state.leave_rooms_usecase.disconnect(&mut session).await;
    send_task.abort();
}

/// Handle one inbound event to completion before the next one is read
async fn dispatch(state: &AppState, session: &mut Session, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(
                "Dropping unparseable frame from '{}': {}",
                session.connection_id(),
                e
            );
            return;
        }
    };

    let (event, result): (&str, Result<Outcome, SessionError>) = match message {
        ClientMessage::JoinRoom(payload) => (
            "join-room",
            state
                .join_room_usecase
                .execute(session, payload.room_id, payload.name)
                .await,
        ),
        ClientMessage::RequestRoomState(payload) => (
            "request-room-state",
            state
                .request_room_state_usecase
                .execute(session, payload.room_id)
                .await,
        ),
        ClientMessage::ChatMessage(payload) => (
            "chat-message",
            state
                .send_chat_usecase
                .execute(
                    session,
                    payload.room_id,
                    payload.message,
                    payload.name,
                    payload.ts,
                )
                .await,
        ),
        ClientMessage::CodeChange(payload) => (
            "code-change",
            state
                .change_code_usecase
                .execute(
                    session,
                    payload.room_id,
                    payload.content,
                    payload.language,
                    payload.ts,
                )
                .await,
        ),
    };

    match result {
        Ok(Outcome::Applied) => {
            tracing::debug!("Handled {} from '{}'", event, session.connection_id())
        }
        Ok(Outcome::Ignored) => {}
        Err(e) => tracing::error!("{} error for '{}': {}", event, session.connection_id(), e),
    }
}
