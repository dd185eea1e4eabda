//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    ChatMessage, CodeChange, DisplayName, MessageText, RoomEvent, RoomId, RoomSnapshot, RoomUser,
    Timestamp, ValueObjectError,
};
use crate::infrastructure::dto::{http as http_dto, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::ChatMessageDto> for ChatMessage {
    type Error = ValueObjectError;

    fn try_from(dto: dto::ChatMessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            room_id: RoomId::new(dto.room_id)?,
            message: MessageText::new(dto.message)?,
            name: DisplayName::new(dto.name)?,
            ts: Timestamp::new(dto.ts),
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for dto::ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            room_id: model.room_id.into_string(),
            message: model.message.into_string(),
            name: model.name.into_string(),
            ts: model.ts.value(),
        }
    }
}

impl From<RoomUser> for dto::UserDto {
    fn from(model: RoomUser) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name.into_string(),
        }
    }
}

impl From<RoomSnapshot> for dto::RoomStatePayload {
    fn from(model: RoomSnapshot) -> Self {
        Self {
            content: model.content,
            language: model.language.into_string(),
            users: model.users.into_iter().map(Into::into).collect(),
            messages: model.messages.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CodeChange> for dto::CodeChangeBroadcast {
    fn from(model: CodeChange) -> Self {
        Self {
            content: model.content,
            language: model.language,
            ts: model.ts,
            from: model.from.into_string(),
        }
    }
}

impl From<RoomEvent> for dto::ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::Connected(id) => dto::ServerMessage::Connected(dto::ConnectedPayload {
                id: id.into_string(),
            }),
            RoomEvent::RoomState(snapshot) => dto::ServerMessage::RoomState(snapshot.into()),
            RoomEvent::UserJoined(user) => dto::ServerMessage::UserJoined(user.into()),
            RoomEvent::UserLeft(user) => dto::ServerMessage::UserLeft(user.into()),
            RoomEvent::ChatMessage(message) => dto::ServerMessage::ChatMessage(message.into()),
            RoomEvent::CodeChange(change) => dto::ServerMessage::CodeChange(change.into()),
        }
    }
}

/// Build the HTTP room detail from a snapshot
pub fn room_detail(room_id: RoomId, snapshot: RoomSnapshot) -> http_dto::RoomDetailDto {
    let state: dto::RoomStatePayload = snapshot.into();
    http_dto::RoomDetailDto {
        id: room_id.into_string(),
        content: state.content,
        language: state.language,
        users: state.users,
        messages: state.messages,
    }
}
