//! エンティティとドメインイベント

use super::value_object::{ConnectionId, DisplayName, Language, MessageText, RoomId, Timestamp};

/// Room に在室しているユーザー（接続単位）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUser {
    pub id: ConnectionId,
    pub name: DisplayName,
}

impl RoomUser {
    pub fn new(id: ConnectionId, name: DisplayName) -> Self {
        Self { id, name }
    }
}

/// チャットメッセージ
///
/// 生成後は変更されない。削除されるのは履歴の切り詰めか Room の削除時のみ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room_id: RoomId,
    pub message: MessageText,
    pub name: DisplayName,
    pub ts: Timestamp,
}

impl ChatMessage {
    pub fn new(room_id: RoomId, message: MessageText, name: DisplayName, ts: Timestamp) -> Self {
        Self {
            room_id,
            message,
            name,
            ts,
        }
    }
}

/// ドキュメントの編集内容
///
/// `content` はドキュメント全体の置き換え（差分ではない）。
/// `from` は編集元の接続で、受信側が自分の編集のエコーを判別するために使う。
/// `content` と `ts` はクライアントから受け取った値をそのまま中継する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChange {
    pub content: Option<serde_json::Value>,
    pub language: Option<String>,
    pub ts: Option<serde_json::Value>,
    pub from: ConnectionId,
}

/// Room の全状態（参加時・再要求時に送る）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub content: String,
    pub language: Language,
    pub users: Vec<RoomUser>,
    /// 古い順
    pub messages: Vec<ChatMessage>,
}

/// クライアントへ通知するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// 接続直後に本人へ採番した ID を知らせる
    Connected(ConnectionId),
    RoomState(RoomSnapshot),
    UserJoined(RoomUser),
    UserLeft(RoomUser),
    ChatMessage(ChatMessage),
    CodeChange(CodeChange),
}
