//! Room ごとのキー名前空間
//!
//! | キー | 型 |
//! |---|---|
//! | `room:{roomId}:content` | string |
//! | `room:{roomId}:language` | string |
//! | `room:{roomId}:users` | hash（connectionId → 表示名） |
//! | `room:{roomId}:messages` | list（新しい順、上限 200 件） |

use crate::domain::RoomId;

pub fn content_key(room_id: &RoomId) -> String {
    format!("room:{}:content", room_id.as_str())
}

pub fn language_key(room_id: &RoomId) -> String {
    format!("room:{}:language", room_id.as_str())
}

pub fn users_key(room_id: &RoomId) -> String {
    format!("room:{}:users", room_id.as_str())
}

pub fn messages_key(room_id: &RoomId) -> String {
    format!("room:{}:messages", room_id.as_str())
}

/// Room の4つのキー全て（TTL と削除は常にこの単位で行う）
pub fn all_keys(room_id: &RoomId) -> [String; 4] {
    [
        content_key(room_id),
        language_key(room_id),
        messages_key(room_id),
        users_key(room_id),
    ]
}
