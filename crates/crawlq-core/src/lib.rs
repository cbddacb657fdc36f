//! crawlq-core
//!
//! Distributed job queue for crawl targets.
//!
//! 複数のワーカープロセスがリモートストア上の 1 本のリストを共有する。
//! 各プロセスはクロール対象を push し、自分が処理できる次のレコードを pop して
//! 型付きの spider に復元する。
//!
//! # モジュール構成
//! - **domain**: レコード（`UrlNode`, `PatternKey`）、ID、エラー
//! - **ports**: 抽象化レイヤー（`ListStore`, Clock, IdGenerator）
//! - **typed**: 型付き Spider API（`Spider` trait, 型消去された factory, 順序付き `HandlerRegistry`, コーデック）
//! - **queue**: `JobQueue`（dedup, enqueue, 上限付き dequeue）とパターンキャッシュ
//! - **impls**: 実装（`InMemoryStore`, `RedisStore`（feature `redis`））
//! - **worker**: `JobQueue` を回す tokio ワーカーグループ

pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;
pub mod typed;
pub mod worker;

pub use config::{ConfigError, QueueConfig};
pub use domain::{CrawlError, JobId, PatternKey, QueueError, UrlNode};
pub use queue::{Job, JobQueue};
pub use typed::{CrawlTask, HandlerRegistry, Spider};
