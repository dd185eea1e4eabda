//! Room Store
//!
//! Repository が前提とする外部 KVS の機能セット
//! {get, set, hash get/set/delete/enumerate, list push/trim/range, expire, delete}
//! を trait として定義します。
//!
//! ## 実装
//!
//! - `inmemory`: プロセス内の実装（Redis と同じ意味論、TTL 付き）
//! - 将来的に: 複数プロセスで共有する外部ストア

pub mod inmemory;

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RepositoryError;

pub use inmemory::InMemoryRoomStore;

/// Room Store のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 別の型の値を持つキーに対する操作
    #[error("WRONGTYPE operation against key '{0}' holding the wrong kind of value")]
    WrongType(String),

    /// ストアに到達できない（接続断・タイムアウト）
    #[error("room store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for RepositoryError {
    fn from(error: StoreError) -> Self {
        RepositoryError::Storage(error.to_string())
    }
}

/// キー単位の TTL を持つ KVS
///
/// リストのインデックスは両端を含み、負の値は末尾から数える。
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// 値を書き込む（既存の TTL は解除される）
    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    async fn hset(&self, key: &str, field: &str, value: String) -> StoreResult<()>;

    /// フィールドを削除し、削除したかどうかを返す
    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool>;

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    async fn hlen(&self, key: &str) -> StoreResult<usize>;

    /// 先頭に追加し、追加後の長さを返す
    async fn lpush(&self, key: &str, value: String) -> StoreResult<usize>;

    /// `start..=stop` の範囲だけを残す
    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> StoreResult<()>;

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    /// TTL を設定する。キーが存在しなければ `false`
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// TTL を解除する。TTL が設定されていなければ `false`
    async fn persist(&self, key: &str) -> StoreResult<bool>;

    /// 残り TTL（キーが無いか TTL 未設定なら `None`）
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// 削除したキーの数を返す
    async fn del(&self, keys: &[String]) -> StoreResult<usize>;
}
