//! Impls - ListStore の実装
//!
//! - **InMemoryStore**: 単一プロセス用（開発・テスト用）
//! - **RedisStore**: 複数ワーカーで共有する本番用ストア（feature `redis`）

pub mod inmem_store;
#[cfg(feature = "redis")]
pub mod redis_store;

pub use self::inmem_store::InMemoryStore;
#[cfg(feature = "redis")]
pub use self::redis_store::RedisStore;
