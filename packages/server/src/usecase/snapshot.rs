//! Room スナップショットの読み出し
//!
//! 参加時・再要求時・HTTP の Room 詳細で共通に使う。

use std::sync::Arc;

use crate::domain::{
    RECENT_MESSAGES_LIMIT, RepositoryError, RoomId, RoomRepository, RoomSnapshot,
};

/// Room の全状態（ドキュメント・言語・在室者・最新 50 件のチャット）を読む
#[derive(Clone)]
pub struct RoomSnapshotQuery {
    repository: Arc<dyn RoomRepository>,
}

impl RoomSnapshotQuery {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn fetch(&self, room_id: &RoomId) -> Result<RoomSnapshot, RepositoryError> {
        let users = self.repository.list_users(room_id).await?;
        let content = self.repository.get_content(room_id).await?;
        let language = self.repository.get_language(room_id).await?;
        let messages = self
            .repository
            .recent_messages(room_id, RECENT_MESSAGES_LIMIT)
            .await?;

        Ok(RoomSnapshot {
            content,
            language,
            users,
            messages,
        })
    }
}
