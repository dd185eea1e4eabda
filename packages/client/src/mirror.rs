//! Local mirror of one room.
//!
//! Applies server events to a local copy of the document, presence and chat.
//! `code-change` events whose `from` is this connection are the server's
//! echo of our own edits and are dropped; the local copy was already updated
//! when the edit was made.

use irori_server::infrastructure::dto::websocket::{ChatMessageDto, ServerMessage, UserDto};

/// Default language until the first snapshot arrives
const INITIAL_LANGUAGE: &str = "javascript";

/// One line of the chat pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLine {
    Message(ChatMessageDto),
    /// Presence notice such as "Bob joined"
    System(String),
}

/// What changed after applying an event (used to decide what to print)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorUpdate {
    Connected(String),
    Snapshot,
    UserJoined(UserDto),
    UserLeft(String),
    Chat(ChatMessageDto),
    CodeChanged {
        content: bool,
        language: Option<String>,
        from: String,
    },
}

#[derive(Debug, Clone)]
pub struct RoomMirror {
    self_id: Option<String>,
    content: String,
    language: String,
    users: Vec<UserDto>,
    chat: Vec<ChatLine>,
}

impl Default for RoomMirror {
    fn default() -> Self {
        Self {
            self_id: None,
            content: String::new(),
            language: INITIAL_LANGUAGE.to_string(),
            users: Vec::new(),
            chat: Vec::new(),
        }
    }
}

impl RoomMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn self_id(&self) -> Option<&str> {
        self.self_id.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn users(&self) -> &[UserDto] {
        &self.users
    }

    pub fn chat(&self) -> &[ChatLine] {
        &self.chat
    }

    /// Record a local edit before it is sent
    pub fn edit_content(&mut self, content: String) {
        self.content = content;
    }

    /// Record a local language change before it is sent
    pub fn set_language(&mut self, language: String) {
        if !language.is_empty() {
            self.language = language;
        }
    }

    /// Apply one server event; `None` when the event changes nothing
    pub fn apply(&mut self, message: ServerMessage) -> Option<MirrorUpdate> {
        match message {
            ServerMessage::Connected(payload) => {
                self.self_id = Some(payload.id.clone());
                Some(MirrorUpdate::Connected(payload.id))
            }
            ServerMessage::RoomState(state) => {
                self.content = state.content;
                self.language = state.language;
                self.users = state.users;
                self.chat = state.messages.into_iter().map(ChatLine::Message).collect();
                Some(MirrorUpdate::Snapshot)
            }
            ServerMessage::UserJoined(user) => {
                if self.users.iter().any(|known| known.id == user.id) {
                    return None;
                }
                self.chat
                    .push(ChatLine::System(format!("{} joined", user.name)));
                self.users.push(user.clone());
                Some(MirrorUpdate::UserJoined(user))
            }
            ServerMessage::UserLeft(user) => {
                self.users.retain(|known| known.id != user.id);
                let text = if user.name.is_empty() {
                    "A user left".to_string()
                } else {
                    format!("{} left", user.name)
                };
                self.chat.push(ChatLine::System(text.clone()));
                Some(MirrorUpdate::UserLeft(text))
            }
            ServerMessage::ChatMessage(message) => {
                self.chat.push(ChatLine::Message(message.clone()));
                Some(MirrorUpdate::Chat(message))
            }
            ServerMessage::CodeChange(change) => {
                if self.self_id.as_deref() == Some(change.from.as_str()) {
                    return None;
                }
                // 文字列以外の content はサーバーでも保存されない
                let text = change
                    .content
                    .as_ref()
                    .and_then(|content| content.as_str());
                let content = text.is_some();
                if let Some(text) = text {
                    self.content = text.to_string();
                }
                let language = change.language.filter(|language| !language.is_empty());
                if let Some(language) = &language {
                    self.language = language.clone();
                }
                if !content && language.is_none() {
                    return None;
                }
                Some(MirrorUpdate::CodeChanged {
                    content,
                    language,
                    from: change.from,
                })
            }
        }
    }

    /// Display name of a user in the room
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .map(|user| user.name.as_str())
    }
}
