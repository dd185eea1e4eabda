//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::{ChatMessageDto, UserDto};

/// Room detail for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub content: String,
    pub language: String,
    pub users: Vec<UserDto>,
    pub messages: Vec<ChatMessageDto>,
}
