//! UseCase: スナップショットの再要求
//!
//! クライアントの準備が整う前に `room-state` が届いてしまった場合の回復用。
//! 在室者には触れず、スナップショットを要求元にだけ送り直す。

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomEvent, RoomId, RoomRepository, Session};

use super::{Outcome, RoomSnapshotQuery, SessionError};

pub struct RequestRoomStateUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    snapshot: RoomSnapshotQuery,
}

impl RequestRoomStateUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            message_pusher,
            snapshot: RoomSnapshotQuery::new(repository),
        }
    }

    pub async fn execute(
        &self,
        session: &Session,
        room_id: String,
    ) -> Result<Outcome, SessionError> {
        if !session.is_open() {
            return Ok(Outcome::Ignored);
        }
        let Ok(room_id) = RoomId::new(room_id) else {
            tracing::debug!(
                "Ignoring request-room-state without room id from '{}'",
                session.connection_id()
            );
            return Ok(Outcome::Ignored);
        };

        let snapshot = self.snapshot.fetch(&room_id).await?;
        self.message_pusher
            .push_to(session.connection_id(), &RoomEvent::RoomState(snapshot))
            .await?;
        Ok(Outcome::Applied)
    }
}
