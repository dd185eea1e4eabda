//! Repository trait 定義
//!
//! ドメイン層が必要とする Room 状態へのアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! Room は明示的に作成されない。いずれかのキーに最初に書き込んだ時点で存在し始め、
//! TTL の経過または `delete_room` で消える。

use std::time::Duration;

use async_trait::async_trait;

use super::{
    ChatMessage, ConnectionId, DisplayName, Language, RepositoryError, RoomId, RoomUser,
};

/// 保持するチャット履歴の上限（超えた分は古い順に破棄）
pub const ROOM_MESSAGES_LIMIT: usize = 200;

/// 参加時に送るチャット履歴の件数
pub const RECENT_MESSAGES_LIMIT: usize = 50;

/// 言語が未設定の Room の言語
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Room State Repository trait
///
/// UseCase 層はこの trait に依存し、ストアの具体的な実装には依存しない。
/// ストアのエラーは `RepositoryError::Storage` として呼び出し元へ伝播し、リトライはしない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 在室ユーザーを追加（同じ接続なら名前を上書き）し、Room の TTL を解除する
    async fn add_user(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        name: &DisplayName,
    ) -> Result<(), RepositoryError>;

    /// 在室ユーザーを削除（存在しなくてもエラーにしない）
    async fn remove_user(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<(), RepositoryError>;

    /// 在室ユーザーの一覧（順序は不定）
    async fn list_users(&self, room_id: &RoomId) -> Result<Vec<RoomUser>, RepositoryError>;

    async fn user_count(&self, room_id: &RoomId) -> Result<usize, RepositoryError>;

    /// ドキュメント全体を置き換える
    async fn set_content(&self, room_id: &RoomId, content: &str) -> Result<(), RepositoryError>;

    /// 未設定なら空文字列
    async fn get_content(&self, room_id: &RoomId) -> Result<String, RepositoryError>;

    /// 言語を設定する（空文字列なら何もしない）
    async fn set_language(&self, room_id: &RoomId, language: &str)
    -> Result<(), RepositoryError>;

    /// 未設定なら `DEFAULT_LANGUAGE`
    async fn get_language(&self, room_id: &RoomId) -> Result<Language, RepositoryError>;

    /// 履歴の先頭（最新側）に追加し、`ROOM_MESSAGES_LIMIT` 件に切り詰める
    async fn append_message(
        &self,
        room_id: &RoomId,
        message: &ChatMessage,
    ) -> Result<(), RepositoryError>;

    /// 最新 `limit` 件を古い順で返す
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// Room の4つのキー全てに同じ TTL を設定する
    async fn set_expiry(&self, room_id: &RoomId, ttl: Duration) -> Result<(), RepositoryError>;

    /// Room の4つのキー全てを即時削除する
    async fn delete_room(&self, room_id: &RoomId) -> Result<(), RepositoryError>;
}
