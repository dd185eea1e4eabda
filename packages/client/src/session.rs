//! WebSocket client session management.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, Stream, StreamExt};
use irori_server::infrastructure::dto::websocket::{
    ClientMessage, CodeChangePayload, ConnectedPayload, JoinRoomPayload, RequestRoomStatePayload,
    SendChatPayload, ServerMessage,
};
use irori_shared::time::now_millis;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use crate::{
    command::{self, Command, HELP},
    error::ClientError,
    formatter::MessageFormatter,
    mirror::{MirrorUpdate, RoomMirror},
    ui::redisplay_prompt,
};

/// How long to wait for the server to announce our connection id
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run one WebSocket client session: join the room and mirror it until the
/// connection drops or the user exits.
pub async fn run_client_session(url: &str, room_id: &str, name: &str) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
        tungstenite::Error::Url(_) => ClientError::InvalidUrl(url.to_string()),
        other => ClientError::ConnectionError(other.to_string()),
    })?;

    let (mut write, mut read) = ws_stream.split();

    let self_id = wait_for_connected(&mut read).await?;
    tracing::info!("Connected as '{}'", self_id);

    let mirror = Arc::new(Mutex::new(RoomMirror::new()));
    mirror
        .lock()
        .await
        .apply(ServerMessage::Connected(ConnectedPayload {
            id: self_id.clone(),
        }));

    // request-room-state is the fallback for a room-state that raced ahead
    for message in [
        ClientMessage::JoinRoom(JoinRoomPayload {
            room_id: room_id.to_string(),
            name: Some(name.to_string()),
        }),
        ClientMessage::RequestRoomState(RequestRoomStatePayload {
            room_id: room_id.to_string(),
        }),
    ] {
        send(&mut write, &message).await?;
    }

    println!(
        "\nYou are '{}' in room '{}'. Type messages and press Enter to send, /help for commands. Press Ctrl+C to exit.\n",
        name, room_id
    );

    // Spawn a task to handle incoming events
    let mirror_for_read = Arc::clone(&mirror);
    let room_for_read = room_id.to_string();
    let name_for_read = name.to_string();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let output = match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(event) => {
                            let mut mirror = mirror_for_read.lock().await;
                            match mirror.apply(event) {
                                Some(update) => render_update(&mirror, &room_for_read, update),
                                None => continue,
                            }
                        }
                        Err(_) => MessageFormatter::format_raw_message(&text),
                    };
                    print!("{}", output);
                    redisplay_prompt(&name_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", name);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str()).ok();
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task that turns prompt input into events
    let room_id = room_id.to_string();
    let name = name.to_string();
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let Some(command) = command::parse(&line) else {
                continue;
            };

            let outgoing = match command {
                Command::Chat(message) => Some(ClientMessage::ChatMessage(SendChatPayload {
                    room_id: room_id.clone(),
                    message,
                    name: Some(name.clone()),
                    ts: Some(now_millis().into()),
                })),
                Command::Code(content) => Some(edit_document(&mirror, &room_id, content).await),
                Command::Load(path) => match tokio::fs::read_to_string(&path).await {
                    Ok(content) => Some(edit_document(&mirror, &room_id, content).await),
                    Err(e) => {
                        println!("\nCannot read '{}': {}", path.display(), e);
                        None
                    }
                },
                Command::Lang(language) => {
                    mirror.lock().await.set_language(language.clone());
                    Some(ClientMessage::CodeChange(CodeChangePayload {
                        room_id: room_id.clone(),
                        content: None,
                        language: Some(language),
                        ts: Some(now_millis().into()),
                    }))
                }
                Command::State => Some(ClientMessage::RequestRoomState(RequestRoomStatePayload {
                    room_id: room_id.clone(),
                })),
                Command::Show => {
                    let mirror = mirror.lock().await;
                    print!(
                        "{}",
                        MessageFormatter::format_document(mirror.content(), mirror.language())
                    );
                    None
                }
                Command::Users => {
                    let mirror = mirror.lock().await;
                    print!(
                        "\n{}",
                        MessageFormatter::format_users(mirror.users(), mirror.self_id())
                    );
                    None
                }
                Command::Help => {
                    println!("\n{}", HELP);
                    None
                }
                Command::Unknown(input) => {
                    println!("\nUnknown command '{}'. Type /help for commands.", input);
                    None
                }
            };

            if let Some(message) = outgoing
                && let Err(e) = send(&mut write, &message).await
            {
                tracing::warn!("Failed to send message: {}", e);
                return true;
            }
            redisplay_prompt(&name);
        }

        false
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}

/// Read frames until the server announces our connection id
async fn wait_for_connected<S>(read: &mut S) -> Result<String, ClientError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let handshake = async {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if let Ok(ServerMessage::Connected(payload)) =
                        serde_json::from_str::<ServerMessage>(&text)
                    {
                        return Ok(payload.id);
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
            }
        }
        Err(ClientError::Handshake(
            "connection closed before the connected event".to_string(),
        ))
    };

    tokio::time::timeout(HANDSHAKE_TIMEOUT, handshake)
        .await
        .map_err(|_| {
            ClientError::Handshake(format!(
                "no connected event within {}s",
                HANDSHAKE_TIMEOUT.as_secs()
            ))
        })?
}

/// Replace the local document and build the matching code-change event
async fn edit_document(
    mirror: &Mutex<RoomMirror>,
    room_id: &str,
    content: String,
) -> ClientMessage {
    let mut mirror = mirror.lock().await;
    mirror.edit_content(content.clone());
    ClientMessage::CodeChange(CodeChangePayload {
        room_id: room_id.to_string(),
        content: Some(content.into()),
        language: Some(mirror.language().to_string()),
        ts: Some(now_millis().into()),
    })
}

async fn send<S>(write: &mut S, message: &ClientMessage) -> Result<(), ClientError>
where
    S: futures_util::Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(message)
        .map_err(|e| ClientError::ConnectionError(format!("cannot encode event: {}", e)))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}

fn render_update(mirror: &RoomMirror, room_id: &str, update: MirrorUpdate) -> String {
    match update {
        MirrorUpdate::Connected(_) => String::new(),
        MirrorUpdate::Snapshot => MessageFormatter::format_snapshot(mirror, room_id),
        MirrorUpdate::UserJoined(user) => {
            MessageFormatter::format_system_line(&format!("{} joined", user.name))
        }
        MirrorUpdate::UserLeft(text) => MessageFormatter::format_system_line(&text),
        MirrorUpdate::Chat(message) => MessageFormatter::format_chat_message(&message),
        MirrorUpdate::CodeChanged {
            content,
            language,
            from,
        } => {
            let editor = mirror.name_of(&from).unwrap_or(&from);
            MessageFormatter::format_code_change(editor, content, language.as_deref())
        }
    }
}
