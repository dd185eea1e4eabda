//! Room Store 上の Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! Room の状態は全てストアに置き、このリポジトリ自身は状態を持たない。
//! そのため同じストアを共有する複数のサーバープロセスから利用できる。
//!
//! チャット履歴は `ChatMessageDto` の JSON としてリストに新しい順で保存する。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    domain::{
        ChatMessage, ConnectionId, DisplayName, Language, ROOM_MESSAGES_LIMIT, RepositoryError,
        RoomId, RoomRepository, RoomUser,
    },
    infrastructure::{dto::websocket::ChatMessageDto, store::RoomStore},
};

use super::keys;

/// Room Store を使った Room Repository 実装
pub struct StoreRoomRepository {
    store: Arc<dyn RoomStore>,
}

impl StoreRoomRepository {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoomRepository for StoreRoomRepository {
    async fn add_user(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        name: &DisplayName,
    ) -> Result<(), RepositoryError> {
        self.store
            .hset(
                &keys::users_key(room_id),
                connection_id.as_str(),
                name.as_str().to_string(),
            )
            .await?;

        // 在室者がいる間は Room の全キーを無期限にする
        for key in keys::all_keys(room_id) {
            self.store.persist(&key).await?;
        }
        Ok(())
    }

    async fn remove_user(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<(), RepositoryError> {
        self.store
            .hdel(&keys::users_key(room_id), connection_id.as_str())
            .await?;
        Ok(())
    }

    async fn list_users(&self, room_id: &RoomId) -> Result<Vec<RoomUser>, RepositoryError> {
        let users = self.store.hgetall(&keys::users_key(room_id)).await?;
        Ok(users
            .into_iter()
            .filter_map(|(id, name)| {
                ConnectionId::new(id)
                    .ok()
                    .map(|id| RoomUser::new(id, DisplayName::or_anonymous(Some(name))))
            })
            .collect())
    }

    async fn user_count(&self, room_id: &RoomId) -> Result<usize, RepositoryError> {
        Ok(self.store.hlen(&keys::users_key(room_id)).await?)
    }

    async fn set_content(&self, room_id: &RoomId, content: &str) -> Result<(), RepositoryError> {
        self.store
            .set(&keys::content_key(room_id), content.to_string())
            .await?;
        Ok(())
    }

    async fn get_content(&self, room_id: &RoomId) -> Result<String, RepositoryError> {
        Ok(self
            .store
            .get(&keys::content_key(room_id))
            .await?
            .unwrap_or_default())
    }

    async fn set_language(
        &self,
        room_id: &RoomId,
        language: &str,
    ) -> Result<(), RepositoryError> {
        if language.is_empty() {
            return Ok(());
        }
        self.store
            .set(&keys::language_key(room_id), language.to_string())
            .await?;
        Ok(())
    }

    async fn get_language(&self, room_id: &RoomId) -> Result<Language, RepositoryError> {
        Ok(self
            .store
            .get(&keys::language_key(room_id))
            .await?
            .and_then(|language| Language::new(language).ok())
            .unwrap_or_default())
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        message: &ChatMessage,
    ) -> Result<(), RepositoryError> {
        let key = keys::messages_key(room_id);
        let encoded = serde_json::to_string(&ChatMessageDto::from(message.clone()))
            .map_err(|e| RepositoryError::Encode(e.to_string()))?;

        self.store.lpush(&key, encoded).await?;
        // 上限を超えた古いメッセージは破棄する（エラーではない）
        self.store
            .ltrim(&key, 0, ROOM_MESSAGES_LIMIT as isize - 1)
            .await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(limit - 1).unwrap_or(isize::MAX);
        let raw = self
            .store
            .lrange(&keys::messages_key(room_id), 0, stop)
            .await?;

        // ストアは新しい順なので、反転して古い順で返す
        Ok(raw
            .into_iter()
            .rev()
            .filter_map(|entry| {
                let decoded = serde_json::from_str::<ChatMessageDto>(&entry)
                    .map_err(|e| e.to_string())
                    .and_then(|dto| ChatMessage::try_from(dto).map_err(|e| e.to_string()));
                match decoded {
                    Ok(message) => Some(message),
                    Err(e) => {
                        tracing::warn!(
                            "Skipping malformed chat history entry in room '{}': {}",
                            room_id,
                            e
                        );
                        None
                    }
                }
            })
            .collect())
    }

    async fn set_expiry(&self, room_id: &RoomId, ttl: Duration) -> Result<(), RepositoryError> {
        for key in keys::all_keys(room_id) {
            self.store.expire(&key, ttl).await?;
        }
        Ok(())
    }

    async fn delete_room(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        self.store.del(&keys::all_keys(room_id)).await?;
        Ok(())
    }
}
