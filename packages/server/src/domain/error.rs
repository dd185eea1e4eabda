//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトの生成に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("chat message must not be empty")]
    EmptyMessage,

    #[error("language must not be empty")]
    EmptyLanguage,
}

/// Repository 操作のエラー
///
/// ストア（外部 KVS）のエラーは種類を区別せず `Storage` として呼び出し元に伝播する。
/// リトライは行わない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),

    #[error("failed to encode chat message: {0}")]
    Encode(String),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}
