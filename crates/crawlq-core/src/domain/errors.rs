//! Errors - エラー型と分類
//!
//! crawl task が返すエラーと、キューの公開 API が返すエラー。

use crate::config::ConfigError;
use crate::ports::StoreError;
use crate::typed::CodecError;

/// ErrorKind はクロール失敗の分類（ワーカーのログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 一時的なエラー（タイムアウト、レート制限など）
    Transient,
    /// 恒久的なエラー（404、パース不能なページなど）
    Permanent,
}

/// CrawlError は 1 つの crawl task の失敗
#[derive(Debug, thiserror::Error)]
#[error("crawl failed (kind: {kind:?}): {message}")]
pub struct CrawlError {
    kind: ErrorKind,
    message: String,
}

impl CrawlError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// QueueError はジョブキューのエラー
///
/// # 呼び出し側に届くもの
/// - `StoreUnreachable`: `JobQueue::connect` のみが返す
/// - それ以外は enqueue/dequeue の内部で発生し、ログに出したうえで `false` / `None` に畳み込まれる
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("job store unreachable at {endpoint}: {source}")]
    StoreUnreachable {
        endpoint: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
