//! WebSocket event DTOs.
//!
//! Every text frame carries one event as `{"event": "<name>", "data": {...}}`.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events sent from a client to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(JoinRoomPayload),
    RequestRoomState(RequestRoomStatePayload),
    ChatMessage(SendChatPayload),
    CodeChange(CodeChangePayload),
}

/// Events sent from the server to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    Connected(ConnectedPayload),
    RoomState(RoomStatePayload),
    UserJoined(UserDto),
    UserLeft(UserDto),
    ChatMessage(ChatMessageDto),
    CodeChange(CodeChangeBroadcast),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    #[serde(default)]
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRoomStatePayload {
    #[serde(default)]
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendChatPayload {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 数値以外や 0 はサーバーの時刻で置き換えられる
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangePayload {
    #[serde(default)]
    pub room_id: String,
    /// 文字列のときだけ保存される。それ以外の値も中継はされる
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPayload {
    pub id: String,
}

/// Full room snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatePayload {
    pub content: String,
    pub language: String,
    pub users: Vec<UserDto>,
    /// oldest first
    pub messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
}

/// Chat message as broadcast and as stored in the room history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub room_id: String,
    pub message: String,
    pub name: String,
    pub ts: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChangeBroadcast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
    pub from: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join_room() {
        // テスト項目: join-room イベントがパースできる
        // given (前提条件):
        let text = r#"{"event":"join-room","data":{"roomId":"r1","name":"Alice"}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            msg,
            ClientMessage::JoinRoom(JoinRoomPayload {
                room_id: "r1".to_string(),
                name: Some("Alice".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_chat_without_optional_fields() {
        // テスト項目: name / ts を省略した chat-message がパースできる
        // given (前提条件):
        let text = r#"{"event":"chat-message","data":{"roomId":"r1","message":"hi"}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        let ClientMessage::ChatMessage(payload) = msg else {
            panic!("expected chat-message");
        };
        assert_eq!(payload.message, "hi");
        assert_eq!(payload.name, None);
        assert_eq!(payload.ts, None);
    }

    #[test]
    fn test_parse_missing_room_id_defaults_to_empty() {
        // テスト項目: roomId が無い場合は空文字列になる（後段で無視される）
        // given (前提条件):
        let text = r#"{"event":"code-change","data":{"content":"x"}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        let ClientMessage::CodeChange(payload) = msg else {
            panic!("expected code-change");
        };
        assert_eq!(payload.room_id, "");
        assert_eq!(payload.content, Some(json!("x")));
    }

    #[test]
    fn test_parse_code_change_with_non_string_content_and_float_ts() {
        // テスト項目: content が文字列でなくても、ts が小数でもフレーム全体は捨てられない
        // given (前提条件):
        let text = r#"{"event":"code-change","data":{"roomId":"r1","content":42,"language":"python","ts":1700000000000.5}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        let ClientMessage::CodeChange(payload) = msg else {
            panic!("expected code-change");
        };
        assert_eq!(payload.content, Some(json!(42)));
        assert_eq!(payload.language, Some("python".to_string()));
        assert_eq!(payload.ts, Some(json!(1700000000000.5)));
    }

    #[test]
    fn test_parse_code_change_with_null_content() {
        // テスト項目: content が null の場合は未指定として扱われる
        // given (前提条件):
        let text = r#"{"event":"code-change","data":{"roomId":"r1","content":null,"language":"go"}}"#;

        // when (操作):
        let msg: ClientMessage = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        let ClientMessage::CodeChange(payload) = msg else {
            panic!("expected code-change");
        };
        assert_eq!(payload.content, None);
    }

    #[test]
    fn test_parse_unknown_event_fails() {
        // テスト項目: 未知のイベントはパースに失敗する
        // given (前提条件):
        let text = r#"{"event":"shutdown","data":{}}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientMessage>(text);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_code_change_broadcast_omits_absent_fields() {
        // テスト項目: code-change のブロードキャストでは未指定のフィールドが省略される
        // given (前提条件):
        let msg = ServerMessage::CodeChange(CodeChangeBroadcast {
            content: None,
            language: Some("python".to_string()),
            ts: None,
            from: "conn-a".to_string(),
        });

        // when (操作):
        let value = serde_json::to_value(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"event": "code-change", "data": {"language": "python", "from": "conn-a"}})
        );
    }

    #[test]
    fn test_room_state_wire_shape() {
        // テスト項目: room-state が仕様どおりの形でシリアライズされる
        // given (前提条件):
        let msg = ServerMessage::RoomState(RoomStatePayload {
            content: "x=1".to_string(),
            language: "python".to_string(),
            users: vec![UserDto {
                id: "c1".to_string(),
                name: "Alice".to_string(),
            }],
            messages: vec![ChatMessageDto {
                room_id: "r1".to_string(),
                message: "hello".to_string(),
                name: "Alice".to_string(),
                ts: 1000,
            }],
        });

        // when (操作):
        let value = serde_json::to_value(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "event": "room-state",
                "data": {
                    "content": "x=1",
                    "language": "python",
                    "users": [{"id": "c1", "name": "Alice"}],
                    "messages": [{"roomId": "r1", "message": "hello", "name": "Alice", "ts": 1000}]
                }
            })
        );
    }
}
