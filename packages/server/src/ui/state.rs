//! Shared application state.

use std::{sync::Arc, time::Duration};

use irori_shared::time::Clock;

use crate::{
    domain::{MessagePusher, RoomRepository},
    usecase::{
        ChangeCodeUseCase, ConnectUseCase, JoinRoomUseCase, LeaveRoomsUseCase,
        RequestRoomStateUseCase, RoomSnapshotQuery, SendChatUseCase,
    },
};

/// Use cases shared by every connection
pub struct AppState {
    pub connect_usecase: ConnectUseCase,
    pub join_room_usecase: JoinRoomUseCase,
    pub request_room_state_usecase: RequestRoomStateUseCase,
    pub send_chat_usecase: SendChatUseCase,
    pub change_code_usecase: ChangeCodeUseCase,
    pub leave_rooms_usecase: LeaveRoomsUseCase,
    /// HTTP の Room 詳細用
    pub room_snapshot_query: RoomSnapshotQuery,
}

impl AppState {
    /// Wire every use case to the same repository and pusher
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        room_ttl: Duration,
    ) -> Self {
        Self {
            connect_usecase: ConnectUseCase::new(message_pusher.clone()),
            join_room_usecase: JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                room_ttl,
            ),
            request_room_state_usecase: RequestRoomStateUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            ),
            send_chat_usecase: SendChatUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock,
            ),
            change_code_usecase: ChangeCodeUseCase::new(repository.clone(), message_pusher.clone()),
            leave_rooms_usecase: LeaveRoomsUseCase::new(
                repository.clone(),
                message_pusher,
                room_ttl,
            ),
            room_snapshot_query: RoomSnapshotQuery::new(repository),
        }
    }
}
