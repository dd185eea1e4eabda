//! UseCase: Room への参加
//!
//! ## 処理の流れ
//!
//! 1. 接続を Room のグループに追加
//! 2. セッションに `{room_id, name}` を記録
//! 3. 在室者として書き込み（Room の TTL も解除される）
//! 4. スナップショットを本人にだけ送る
//! 5. `user-joined` を本人以外に送る
//!
//! 途中で失敗した場合はそこで打ち切る（グループにだけ参加している状態が残り得る）。
//!
//! 別の Room に参加中の接続が参加し直した場合は、先に元の Room から退出する。
//! 同じ Room への再参加は在室者の上書きになり、スナップショットと `user-joined` を再送する。

use std::{sync::Arc, time::Duration};

use crate::domain::{
    DisplayName, MessagePusher, RoomEvent, RoomId, RoomRepository, RoomUser, Session,
};

use super::{LeaveRoomsUseCase, Outcome, RoomSnapshotQuery, SessionError};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    snapshot: RoomSnapshotQuery,
    leave: LeaveRoomsUseCase,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        room_ttl: Duration,
    ) -> Self {
        Self {
            snapshot: RoomSnapshotQuery::new(repository.clone()),
            leave: LeaveRoomsUseCase::new(repository.clone(), message_pusher.clone(), room_ttl),
            repository,
            message_pusher,
        }
    }

    /// Room への参加を実行
    ///
    /// # Arguments
    ///
    /// * `session` - 参加する接続のセッション
    /// * `room_id` - 参加する Room の ID（空なら何もしない）
    /// * `name` - 表示名（未指定なら `Anonymous`）
    pub async fn execute(
        &self,
        session: &mut Session,
        room_id: String,
        name: Option<String>,
    ) -> Result<Outcome, SessionError> {
        if !session.is_open() {
            tracing::debug!(
                "Ignoring join-room from closing connection '{}'",
                session.connection_id()
            );
            return Ok(Outcome::Ignored);
        }
        let Ok(room_id) = RoomId::new(room_id) else {
            tracing::debug!(
                "Ignoring join-room without room id from '{}'",
                session.connection_id()
            );
            return Ok(Outcome::Ignored);
        };
        let name = DisplayName::or_anonymous(name);
        let connection_id = session.connection_id().clone();

        if let Some(previous) = session.data().cloned()
            && previous.room_id != room_id
        {
            if let Err(e) = self
                .leave
                .leave_room(&previous.room_id, &connection_id, &previous.name)
                .await
            {
                tracing::error!(
                    "Failed to leave room '{}' before joining '{}': {}",
                    previous.room_id,
                    room_id,
                    e
                );
            }
        }

        self.message_pusher
            .join_group(&room_id, &connection_id)
            .await;
        session.attach(room_id.clone(), name.clone());
        self.repository
            .add_user(&room_id, &connection_id, &name)
            .await?;

        let snapshot = self.snapshot.fetch(&room_id).await?;
        self.message_pusher
            .push_to(&connection_id, &RoomEvent::RoomState(snapshot))
            .await?;

        let joined = RoomEvent::UserJoined(RoomUser::new(connection_id.clone(), name.clone()));
        self.message_pusher
            .broadcast_except(&room_id, &joined, &connection_id)
            .await?;

        tracing::info!(
            "Connection '{}' joined room '{}' as '{}'",
            connection_id,
            room_id,
            name.as_str()
        );
        Ok(Outcome::Applied)
    }
}
