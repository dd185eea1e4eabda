//! UseCase: 接続の受け付け
//!
//! WebSocket の upgrade 直後に呼ばれる。接続 ID を採番して Transport Hub に登録し、
//! 本人にだけ `connected` で ID を知らせる（エコー判別用）。

use std::sync::Arc;

use crate::domain::{ConnectionIdFactory, MessagePusher, PusherChannel, RoomEvent, Session};

use super::SessionError;

/// 接続受け付けのユースケース
pub struct ConnectUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録し、`Unjoined` のセッションを返す
    pub async fn execute(&self, sender: PusherChannel) -> Result<Session, SessionError> {
        let connection_id = ConnectionIdFactory::generate();

        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;
        self.message_pusher
            .push_to(&connection_id, &RoomEvent::Connected(connection_id.clone()))
            .await?;

        tracing::info!("Connection '{}' established", connection_id);
        Ok(Session::new(connection_id))
    }
}
