//! ListStore port - 共有リモートストアの抽象化（本番は Redis）
//!
//! キューが使うのは少数のプリミティブだけ:
//! - dedup 用のキー存在確認と書き込み
//! - FIFO として使う 1 本のリスト（`push` は新しい側へ、`pop` は古い側から）
//!
//! # 原子性
//! - 各プリミティブ単体は atomic とみなす
//! - 複数の呼び出しの組は atomic ではない（プロセス間で自由に交錯する）

use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store command error: {0}")]
    Command(String),
}

#[async_trait]
pub trait ListStore: Send + Sync {
    /// ストアの場所（ログとエラー表示用）
    fn endpoint(&self) -> String;

    /// 疎通確認。`JobQueue::connect` で 1 度だけ呼ばれる
    async fn ping(&self) -> Result<(), StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// `list` の新しい側に `value` を追加
    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError>;

    /// `list` の最も古い値を取り出す
    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError>;

    async fn len(&self, list: &str) -> Result<usize, StoreError>;
}
