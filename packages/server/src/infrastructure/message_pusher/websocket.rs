//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - WebSocket の `UnboundedSender` を接続 ID ごとに管理
//! - Room 単位のグループ（接続とグループは多対多）
//! - `RoomEvent` を JSON のフレームにエンコードして送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信は channel への投入だけなので、ロックを保持したまま送っても待たされない。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomEvent, RoomId},
    infrastructure::dto::websocket::ServerMessage,
};

#[derive(Default)]
struct Hub {
    /// 接続中のクライアントの WebSocket sender
    clients: HashMap<ConnectionId, PusherChannel>,
    /// Room ごとの所属接続
    groups: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl Hub {
    fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.groups
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// ブロードキャストでは一部の送信失敗を許容
    fn fan_out<'a>(&self, targets: impl Iterator<Item = &'a ConnectionId>, frame: &str) {
        for target in targets {
            match self.clients.get(target) {
                Some(sender) => {
                    if let Err(e) = sender.send(frame.to_string()) {
                        tracing::warn!("Failed to push message to client '{}': {}", target, e);
                    } else {
                        tracing::debug!("Broadcasted message to client '{}'", target);
                    }
                }
                None => {
                    tracing::warn!("Client '{}' not found during broadcast, skipping", target);
                }
            }
        }
    }
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(connection_id.clone(), tx).await;
/// pusher.join_group(&room_id, &connection_id).await;
/// pusher.broadcast(&room_id, &event).await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    hub: Mutex<Hub>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(event: &RoomEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerMessage::from(event.clone()))
            .map_err(|e| MessagePushError::Encode(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut hub = self.hub.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", connection_id);
        hub.clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut hub = self.hub.lock().await;
        hub.clients.remove(connection_id);
        hub.groups.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
        tracing::debug!("Client '{}' unregistered from MessagePusher", connection_id);
    }

    async fn join_group(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let mut hub = self.hub.lock().await;
        hub.groups
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id.clone());
        tracing::debug!("Client '{}' joined group '{}'", connection_id, room_id);
    }

    async fn leave_group(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let mut hub = self.hub.lock().await;
        if let Some(members) = hub.groups.get_mut(room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                hub.groups.remove(room_id);
            }
        }
        tracing::debug!("Client '{}' left group '{}'", connection_id, room_id);
    }

    async fn groups_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let hub = self.hub.lock().await;
        hub.groups
            .iter()
            .filter(|(_, members)| members.contains(connection_id))
            .map(|(room_id, _)| room_id.clone())
            .collect()
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let hub = self.hub.lock().await;

        if let Some(sender) = hub.clients.get(connection_id) {
            sender
                .send(frame)
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to client '{}'", connection_id);
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(
                connection_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let hub = self.hub.lock().await;
        let targets = hub.members(room_id);
        hub.fan_out(targets.iter(), &frame);
        Ok(())
    }

    async fn broadcast_except(
        &self,
        room_id: &RoomId,
        event: &RoomEvent,
        exclude: &ConnectionId,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let hub = self.hub.lock().await;
        let targets = hub.members(room_id);
        hub.fan_out(targets.iter().filter(|target| *target != exclude), &frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, RoomUser};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定の接続への送信
    // - broadcast / broadcast_except: グループへのファンアウト
    // - グループの参加・離脱と、登録解除時の全グループからの除去
    //
    // 【なぜこのテストが必要か】
    // - 誰にどのイベントが届くかは UseCase の振る舞いそのもの
    // - 送信元を含む／含まないの取り違えはクライアントの表示を壊す
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn joined_event() -> RoomEvent {
        RoomEvent::UserJoined(RoomUser::new(
            conn("alice"),
            DisplayName::new("Alice".to_string()).unwrap(),
        ))
    }

    async fn register(
        pusher: &WebSocketMessagePusher,
        id: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(conn(id), tx).await;
        rx
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のクライアントにエンコード済みのイベントを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx = register(&pusher, "alice").await;

        // when (操作):
        let result = pusher
            .push_to(&conn("alice"), &RoomEvent::Connected(conn("alice")))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        let received = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&received).unwrap();
        assert_eq!(value["event"], "connected");
        assert_eq!(value["data"]["id"], "alice");
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しないクライアントへの送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&conn("nonexistent"), &joined_event()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_only_group_members() {
        // テスト項目: broadcast は同じグループの全員（送信元を含む）にだけ届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx_alice = register(&pusher, "alice").await;
        let mut rx_bob = register(&pusher, "bob").await;
        let mut rx_carol = register(&pusher, "carol").await;
        pusher.join_group(&room("r1"), &conn("alice")).await;
        pusher.join_group(&room("r1"), &conn("bob")).await;
        pusher.join_group(&room("r2"), &conn("carol")).await;

        // when (操作):
        let result = pusher.broadcast(&room("r1"), &joined_event()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(rx_alice.recv().await.is_some());
        assert!(rx_bob.recv().await.is_some());
        assert!(rx_carol.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_except_skips_excluded_connection() {
        // テスト項目: broadcast_except は除外した接続には届かない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx_alice = register(&pusher, "alice").await;
        let mut rx_bob = register(&pusher, "bob").await;
        pusher.join_group(&room("r1"), &conn("alice")).await;
        pusher.join_group(&room("r1"), &conn("bob")).await;

        // when (操作):
        let result = pusher
            .broadcast_except(&room("r1"), &joined_event(), &conn("alice"))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(rx_bob.recv().await.is_some());
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 受信側が閉じた接続があってもブロードキャストは成功する
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx_alice = register(&pusher, "alice").await;
        let rx_bob = register(&pusher, "bob").await;
        pusher.join_group(&room("r1"), &conn("alice")).await;
        pusher.join_group(&room("r1"), &conn("bob")).await;
        drop(rx_bob);

        // when (操作):
        let result = pusher.broadcast(&room("r1"), &joined_event()).await;

        // then (期待する結果):
        assert!(result.is_ok()); // ブロードキャストは部分失敗を許容
        assert!(rx_alice.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_group() {
        // テスト項目: 誰もいないグループへのブロードキャストもエラーにならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.broadcast(&room("empty"), &joined_event()).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_group_membership_is_many_to_many() {
        // テスト項目: 1つの接続が複数グループに所属でき、離脱は指定したグループだけに効く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let _rx = register(&pusher, "alice").await;
        pusher.join_group(&room("r1"), &conn("alice")).await;
        pusher.join_group(&room("r2"), &conn("alice")).await;

        // when (操作):
        pusher.leave_group(&room("r1"), &conn("alice")).await;

        // then (期待する結果):
        assert_eq!(pusher.groups_of(&conn("alice")).await, vec![room("r2")]);
    }

    #[tokio::test]
    async fn test_unregister_removes_from_all_groups() {
        // テスト項目: 登録解除すると全グループから外れ、以後は届かない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let _rx = register(&pusher, "alice").await;
        pusher.join_group(&room("r1"), &conn("alice")).await;
        pusher.join_group(&room("r2"), &conn("alice")).await;

        // when (操作):
        pusher.unregister_client(&conn("alice")).await;

        // then (期待する結果):
        assert!(pusher.groups_of(&conn("alice")).await.is_empty());
        assert!(matches!(
            pusher.push_to(&conn("alice"), &joined_event()).await,
            Err(MessagePushError::ClientNotFound(_))
        ));
    }
}
