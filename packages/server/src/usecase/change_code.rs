//! UseCase: ドキュメントの編集
//!
//! `content` はドキュメント全体の置き換えで、最後に書いたものが勝つ（マージしない）。
//! 送信元を含む Room の全員に `from` 付きで送り、エコーの判別はクライアントに任せる。

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{CodeChange, MessagePusher, RoomEvent, RoomId, RoomRepository, Session};

use super::{Outcome, SessionError};

/// ドキュメント編集のユースケース
pub struct ChangeCodeUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ChangeCodeUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ドキュメント編集を実行
    ///
    /// `content` が文字列なら（空文字列でも）保存し、
    /// `language` は空でなければ保存する。`content` と `ts` は受け取った値のまま中継する。
    pub async fn execute(
        &self,
        session: &Session,
        room_id: String,
        content: Option<Value>,
        language: Option<String>,
        ts: Option<Value>,
    ) -> Result<Outcome, SessionError> {
        if !session.is_open() {
            return Ok(Outcome::Ignored);
        }
        let Ok(room_id) = RoomId::new(room_id) else {
            tracing::debug!(
                "Ignoring code-change without room id from '{}'",
                session.connection_id()
            );
            return Ok(Outcome::Ignored);
        };

        if let Some(Value::String(content)) = &content {
            self.repository.set_content(&room_id, content).await?;
        }
        if let Some(language) = language.as_deref().filter(|language| !language.is_empty()) {
            self.repository.set_language(&room_id, language).await?;
        }

        let change = CodeChange {
            content,
            language,
            ts,
            from: session.connection_id().clone(),
        };
        self.message_pusher
            .broadcast(&room_id, &RoomEvent::CodeChange(change))
            .await?;
        Ok(Outcome::Applied)
    }
}
