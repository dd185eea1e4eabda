//! 接続ごとのセッション状態
//!
//! 状態遷移: `Unjoined → Joined → Disconnecting → Disconnected`
//!
//! 再接続という状態は持たない。切断された接続は最初から参加し直し、
//! 参加時に Room の全状態を受け取る。

use super::value_object::{ConnectionId, DisplayName, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unjoined,
    Joined,
    Disconnecting,
    Disconnected,
}

/// 参加時に接続へ記録する情報（切断時にどの Room を片付けるかに使う）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub room_id: RoomId,
    pub name: DisplayName,
}

#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    state: ConnectionState,
    data: Option<SessionData>,
}

impl Session {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            state: ConnectionState::Unjoined,
            data: None,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn data(&self) -> Option<&SessionData> {
        self.data.as_ref()
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.data.as_ref().map(|data| &data.room_id)
    }

    pub fn name(&self) -> Option<&DisplayName> {
        self.data.as_ref().map(|data| &data.name)
    }

    /// イベントを受け付ける状態か
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Unjoined | ConnectionState::Joined
        )
    }

    /// Room への参加を記録し、直前に記録されていた情報を返す
    ///
    /// 切断処理中・切断済みの場合は何もしない。
    pub fn attach(&mut self, room_id: RoomId, name: DisplayName) -> Option<SessionData> {
        if !self.is_open() {
            return None;
        }
        self.state = ConnectionState::Joined;
        self.data.replace(SessionData { room_id, name })
    }

    /// 切断処理を開始する。既に開始済みなら `false`
    pub fn begin_disconnecting(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = ConnectionState::Disconnecting;
        true
    }

    pub fn finish_disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}
