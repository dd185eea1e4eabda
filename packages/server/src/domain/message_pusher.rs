//! MessagePusher trait 定義
//!
//! Realtime Transport Hub のインターフェース。接続の登録、Room 単位のグループ管理
//! （接続とグループは多対多）、グループへのファンアウトを提供する。
//!
//! 配送保証は接続ごとの FIFO のみ。接続していない相手には届かず、永続化もしない。
//! グループはプロセスローカルなので、複数プロセスに配る場合はこの trait を
//! Pub/Sub を挟んだ実装に差し替える。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomEvent, RoomId};

/// 接続ごとの送信チャンネル（エンコード済みのフレームを運ぶ）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の登録を解除し、所属している全グループから外す
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 接続をグループ（Room）に追加
    async fn join_group(&self, room_id: &RoomId, connection_id: &ConnectionId);

    /// 接続をグループ（Room）から外す
    async fn leave_group(&self, room_id: &RoomId, connection_id: &ConnectionId);

    /// 接続が所属しているグループの一覧
    async fn groups_of(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// 特定の接続にだけ送る
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// グループの全員に送る（送信元も含む）
    async fn broadcast(&self, room_id: &RoomId, event: &RoomEvent)
    -> Result<(), MessagePushError>;

    /// グループの `exclude` 以外の全員に送る
    async fn broadcast_except(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
        exclude: &ConnectionId,
    ) -> Result<(), MessagePushError>;
}
