//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{MessagePushError, RepositoryError};

/// Session Manager のエラー
///
/// クライアントには返さない（ワイヤープロトコルにエラーイベントは無い）。
/// UI 層でログに出して、そのイベントの処理を打ち切る。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}
