//! UseCase: Room からの退出と切断
//!
//! ## 処理の流れ
//!
//! 1. `disconnecting`: 接続が所属する全 Room について、在室者から外し、
//!    残りの参加者に `user-left` を送り、在室者が 0 人になったら Room の全キーに TTL を設定する
//! 2. `disconnect`: Transport Hub から接続を外し、セッションを終了する
//!
//! 人数の確認と TTL の設定はアトミックではない。確認の直後に別の接続が参加すると、
//! 在室者がいる Room に TTL が残ることがある（次の参加で解除される）。

use std::{sync::Arc, time::Duration};

use crate::domain::{
    ConnectionId, DisplayName, MessagePusher, RoomEvent, RoomId, RoomRepository, RoomUser,
    Session,
};

use super::{Outcome, SessionError};

/// Room 退出のユースケース
pub struct LeaveRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    /// 空になった Room の TTL
    room_ttl: Duration,
}

impl LeaveRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        room_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            room_ttl,
        }
    }

    /// 切断処理の開始（`Joined → Disconnecting`）
    ///
    /// Room ごとのエラーはログに出して次の Room の処理を続ける。
    pub async fn disconnecting(&self, session: &mut Session) -> Outcome {
        if !session.begin_disconnecting() {
            return Outcome::Ignored;
        }

        let connection_id = session.connection_id().clone();
        let name = session
            .name()
            .cloned()
            .unwrap_or_else(DisplayName::anonymous);

        for room_id in self.message_pusher.groups_of(&connection_id).await {
            if let Err(e) = self.leave_room(&room_id, &connection_id, &name).await {
                tracing::error!(
                    "Failed to leave room '{}' for connection '{}': {}",
                    room_id,
                    connection_id,
                    e
                );
            }
        }
        Outcome::Applied
    }

    /// 切断の完了（`Disconnecting → Disconnected`）
    pub async fn disconnect(&self, session: &mut Session) {
        self.message_pusher
            .unregister_client(session.connection_id())
            .await;
        session.finish_disconnect();
        tracing::info!("Connection '{}' disconnected", session.connection_id());
    }

    /// 1つの Room から退出する
    pub async fn leave_room(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        name: &DisplayName,
    ) -> Result<(), SessionError> {
        self.message_pusher
            .leave_group(room_id, connection_id)
            .await;
        self.repository.remove_user(room_id, connection_id).await?;

        let left = RoomEvent::UserLeft(RoomUser::new(connection_id.clone(), name.clone()));
        self.message_pusher
            .broadcast_except(room_id, &left, connection_id)
            .await?;

        let remaining = self.repository.user_count(room_id).await?;
        if remaining == 0 {
            self.repository.set_expiry(room_id, self.room_ttl).await?;
            tracing::info!(
                "Room '{}' became empty; set TTL {}s",
                room_id,
                self.room_ttl.as_secs()
            );
        }
        Ok(())
    }
}
