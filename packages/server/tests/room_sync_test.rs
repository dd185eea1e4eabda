//! Integration tests: the full server on an ephemeral port, driven over
//! WebSocket and HTTP.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use irori_server::{
    config::ServerConfig,
    domain::RoomId,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{StoreRoomRepository, keys},
        store::{InMemoryRoomStore, RoomStore},
    },
    ui::{AppState, Server},
};
use irori_shared::time::SystemClock;
use serde_json::{Value, json};
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const ROOM_TTL: Duration = Duration::from_secs(3600);
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Helper struct to manage the server lifecycle
struct TestServer {
    port: u16,
    store: Arc<InMemoryRoomStore>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let store = Arc::new(InMemoryRoomStore::new());
        let state = AppState::new(
            Arc::new(StoreRoomRepository::new(store.clone())),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(SystemClock),
            ROOM_TTL,
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ServerConfig {
            port,
            room_ttl: ROOM_TTL,
            ..ServerConfig::default()
        };

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            Server::new(config, state)
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        TestServer {
            port,
            store,
            shutdown: Some(tx),
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn room_ttls(&self, room_id: &str) -> Vec<Option<Duration>> {
        let room_id = RoomId::new(room_id.to_string()).unwrap();
        let mut ttls = Vec::new();
        for key in keys::all_keys(&room_id) {
            ttls.push(self.store.ttl(&key).await.unwrap());
        }
        ttls
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Helper struct for one WebSocket client
struct TestClient {
    id: String,
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and read the `connected` event
    async fn connect(server: &TestServer) -> Self {
        let (ws, _) = connect_async(server.ws_url()).await.unwrap();
        let mut client = TestClient {
            id: String::new(),
            ws,
        };
        let connected = client.recv().await;
        assert_eq!(connected["event"], "connected");
        client.id = connected["data"]["id"].as_str().unwrap().to_string();
        client
    }

    async fn send(&mut self, event: &str, data: Value) {
        let frame = json!({"event": event, "data": data}).to_string();
        self.ws.send(Message::text(frame)).await.unwrap();
    }

    async fn send_raw(&mut self, frame: &str) {
        self.ws.send(Message::text(frame.to_string())).await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        self.try_recv(RECV_TIMEOUT)
            .await
            .expect("timed out waiting for an event")
    }

    async fn try_recv(&mut self, timeout: Duration) -> Option<Value> {
        loop {
            let frame = tokio::time::timeout(timeout, self.ws.next()).await.ok()??;
            if let Message::Text(text) = frame.unwrap() {
                return Some(serde_json::from_str(text.as_str()).unwrap());
            }
        }
    }

    /// join-room して room-state を受け取る
    async fn join(&mut self, room_id: &str, name: &str) -> Value {
        self.send("join-room", json!({"roomId": room_id, "name": name}))
            .await;
        let state = self.recv().await;
        assert_eq!(state["event"], "room-state");
        state
    }

    async fn close(mut self) {
        self.ws.close(None).await.unwrap();
    }
}

/// 条件が満たされるまで待つ（切断処理はサーバー側で非同期に進むため）
async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition was not met in time");
}

#[tokio::test]
async fn test_health_endpoints() {
    // テスト項目: ヘルスチェックが OK を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let health: Value = reqwest::get(server.http_url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let api_health: Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"ok": true}));
    assert_eq!(api_health, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_fresh_room_has_default_state() {
    // テスト項目: 初めて参加した Room は空のドキュメントと javascript で始まる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;

    // when (操作):
    let state = alice.join("fresh", "Alice").await;

    // then (期待する結果):
    assert_eq!(state["data"]["content"], "");
    assert_eq!(state["data"]["language"], "javascript");
    assert_eq!(
        state["data"]["users"],
        json!([{"id": alice.id.clone(), "name": "Alice"}])
    );
    assert_eq!(state["data"]["messages"], json!([]));
}

#[tokio::test]
async fn test_code_change_reaches_peers_and_late_joiner() {
    // テスト項目: 編集が他の参加者に from 付きで届き、後から参加した接続の再要求にも反映される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("r1", "Alice").await;
    bob.join("r1", "Bob").await;
    assert_eq!(alice.recv().await["event"], "user-joined");

    // when (操作):
    alice
        .send(
            "code-change",
            json!({"roomId": "r1", "content": "x=1", "language": "python"}),
        )
        .await;

    // then (期待する結果):
    let change = bob.recv().await;
    assert_eq!(change["event"], "code-change");
    assert_eq!(change["data"]["content"], "x=1");
    assert_eq!(change["data"]["language"], "python");
    assert_eq!(change["data"]["from"], alice.id.as_str());

    let echo = alice.recv().await;
    assert_eq!(echo["data"]["from"], alice.id.as_str());

    let mut carol = TestClient::connect(&server).await;
    carol.join("r1", "Carol").await;
    carol
        .send("request-room-state", json!({"roomId": "r1"}))
        .await;
    let state = carol.recv().await;
    assert_eq!(state["event"], "room-state");
    assert_eq!(state["data"]["content"], "x=1");
    assert_eq!(state["data"]["language"], "python");
}

#[tokio::test]
async fn test_code_change_with_non_string_content_still_changes_language() {
    // テスト項目: content が文字列でない編集でも、言語は保存され、イベントは全員に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    alice.join("r1", "Alice").await;

    // when (操作):
    alice
        .send(
            "code-change",
            json!({"roomId": "r1", "content": 42, "language": "python"}),
        )
        .await;

    // then (期待する結果):
    let change = alice.recv().await;
    assert_eq!(change["event"], "code-change");
    assert_eq!(change["data"]["content"], 42);
    assert_eq!(change["data"]["language"], "python");

    alice
        .send("request-room-state", json!({"roomId": "r1"}))
        .await;
    let state = alice.recv().await;
    assert_eq!(state["data"]["content"], "");
    assert_eq!(state["data"]["language"], "python");
}

#[tokio::test]
async fn test_chat_is_delivered_once_to_everyone() {
    // テスト項目: チャットは送信元を含む全員にちょうど 1 回届き、履歴が 1 件増える
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("r1", "Alice").await;
    bob.join("r1", "Bob").await;
    assert_eq!(alice.recv().await["event"], "user-joined");

    // when (操作):
    alice
        .send(
            "chat-message",
            json!({"roomId": "r1", "message": "hello", "name": "Alice", "ts": 1000}),
        )
        .await;

    // then (期待する結果):
    for client in [&mut alice, &mut bob] {
        let chat = client.recv().await;
        assert_eq!(chat["event"], "chat-message");
        assert_eq!(
            chat["data"],
            json!({"roomId": "r1", "message": "hello", "name": "Alice", "ts": 1000})
        );
        assert!(client.try_recv(Duration::from_millis(200)).await.is_none());
    }

    let detail: Value = reqwest::get(server.http_url("/api/rooms/r1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["messages"].as_array().unwrap().len(), 1);
    assert_eq!(detail["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_room_gets_ttl_only_after_last_user_leaves() {
    // テスト項目: 1 人目の切断では TTL は付かず、最後の 1 人の切断で全キーに TTL が付く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("r1", "Alice").await;
    bob.join("r1", "Bob").await;
    alice
        .send(
            "code-change",
            json!({"roomId": "r1", "content": "x=1", "language": "python"}),
        )
        .await;
    assert_eq!(bob.recv().await["event"], "code-change");
    let alice_id = alice.id.clone();

    // when (操作): Alice が切断
    alice.close().await;

    // then (期待する結果): Bob に user-left が届き、TTL はまだ無い
    let left = bob.recv().await;
    assert_eq!(left["event"], "user-left");
    assert_eq!(left["data"]["id"], alice_id.as_str());
    assert_eq!(left["data"]["name"], "Alice");
    assert!(server.room_ttls("r1").await.iter().all(Option::is_none));

    // when (操作): Bob も切断
    bob.close().await;

    // then (期待する結果): 残っているキーに TTL が付く
    let server_ref = &server;
    eventually(|| async move {
        let ttls = server_ref.room_ttls("r1").await;
        ttls[0].is_some() && ttls[1].is_some()
    })
    .await;
    let ttls = server.room_ttls("r1").await;
    assert!(ttls[0].unwrap() <= ROOM_TTL);
}

#[tokio::test]
async fn test_invalid_frames_are_ignored() {
    // テスト項目: 解析できないフレームや room id の無いイベントは無視され、接続は使い続けられる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;

    // when (操作):
    alice.send_raw("not json").await;
    alice.send_raw(r#"{"event":"unknown-event","data":{}}"#).await;
    alice.send("join-room", json!({"name": "Alice"})).await;
    alice
        .send("chat-message", json!({"roomId": "r1", "message": ""}))
        .await;

    // then (期待する結果):
    assert!(alice.try_recv(Duration::from_millis(300)).await.is_none());
    let state = alice.join("r1", "Alice").await;
    assert_eq!(state["data"]["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_switching_rooms_leaves_the_previous_room() {
    // テスト項目: 別の Room に参加し直すと元の Room の参加者に user-left が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    bob.join("r1", "Bob").await;
    alice.join("r1", "Alice").await;
    assert_eq!(bob.recv().await["event"], "user-joined");

    // when (操作):
    let state = alice.join("r2", "Alice").await;

    // then (期待する結果):
    assert_eq!(state["data"]["users"].as_array().unwrap().len(), 1);
    let left = bob.recv().await;
    assert_eq!(left["event"], "user-left");
    assert_eq!(left["data"]["id"], alice.id.as_str());
}
