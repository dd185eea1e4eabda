//! UseCase: チャットメッセージの送信
//!
//! 履歴に追加してから、送信元を含む Room の全員に送る。
//! 送信元の表示も往復したメッセージで更新される（ローカルエコーはしない）。

use std::sync::Arc;

use irori_shared::time::Clock;
use serde_json::Value;

use crate::domain::{
    ChatMessage, DisplayName, MessagePusher, MessageText, RoomEvent, RoomId, RoomRepository,
    Session, Timestamp,
};

use super::{Outcome, SessionError};

/// チャット送信のユースケース
pub struct SendChatUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendChatUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// チャット送信を実行
    ///
    /// 名前はペイロード、セッションの名前、`Anonymous` の順にフォールバックする。
    /// 時刻は 0 以外の数値ならそれを使い（小数は切り捨て）、それ以外はサーバーの現在時刻を使う。
    pub async fn execute(
        &self,
        session: &Session,
        room_id: String,
        message: String,
        name: Option<String>,
        ts: Option<Value>,
    ) -> Result<Outcome, SessionError> {
        if !session.is_open() {
            return Ok(Outcome::Ignored);
        }
        let (Ok(room_id), Ok(message)) = (RoomId::new(room_id), MessageText::new(message)) else {
            tracing::debug!(
                "Ignoring chat-message without room id or text from '{}'",
                session.connection_id()
            );
            return Ok(Outcome::Ignored);
        };

        let name = name
            .and_then(|name| DisplayName::new(name).ok())
            .or_else(|| session.name().cloned())
            .unwrap_or_else(DisplayName::anonymous);
        let ts = ts
            .as_ref()
            .and_then(epoch_millis)
            .filter(|ts| *ts != 0)
            .map(Timestamp::new)
            .unwrap_or_else(|| Timestamp::new(self.clock.now_millis()));

        let chat = ChatMessage::new(room_id.clone(), message, name, ts);
        self.repository.append_message(&room_id, &chat).await?;
        self.message_pusher
            .broadcast(&room_id, &RoomEvent::ChatMessage(chat))
            .await?;
        Ok(Outcome::Applied)
    }
}

/// JSON の数値をエポックミリ秒として読む
fn epoch_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|ts| ts.is_finite()).map(|ts| ts as i64))
}
