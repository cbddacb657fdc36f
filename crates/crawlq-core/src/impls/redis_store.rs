//! RedisStore - Redis ベースの ListStore（feature `redis`）
//!
//! # コマンド対応
//! - `EXISTS`, `SET`, `LPUSH`（push）, `RPOP`（pop）, `LLEN`, `PING`
//!
//! # 接続
//! - multiplexed connection を 1 本だけ遅延生成し、全呼び出しで共有する

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::OnceCell;

use crate::config::QueueConfig;
use crate::ports::{ListStore, StoreError};

pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<MultiplexedConnection>,
    endpoint: String,
}

impl RedisStore {
    /// `redis_url`（例: `redis://127.0.0.1:6379/`）のストアを作る
    ///
    /// ここでは接続しない。最初のコマンド（通常は起動時の疎通確認）で接続する。
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            endpoint: redis_url.as_ref().to_string(),
        })
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self, StoreError> {
        Self::new(config.redis_url())
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                self.client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(|e| StoreError::Connection(e.to_string()))
            })
            .await?;
        Ok(conn.clone())
    }
}

fn map_err(e: redis::RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Command(e.to_string())
    }
}

#[async_trait]
impl ListStore for RedisStore {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        conn.exists(key).await.map_err(map_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.set(key, value).await.map_err(map_err)
    }

    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: i64 = conn.lpush(list, value).await.map_err(map_err)?;
        Ok(())
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        conn.rpop(list, None).await.map_err(map_err)
    }

    async fn len(&self, list: &str) -> Result<usize, StoreError> {
        let mut conn = self.connection().await?;
        conn.llen(list).await.map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url() {
        assert!(matches!(
            RedisStore::new("not a url"),
            Err(StoreError::Connection(_))
        ));
    }

    #[test]
    fn endpoint_comes_from_config() {
        let config = QueueConfig {
            redis_host: "10.1.2.3".to_string(),
            redis_port: 6380,
            ..QueueConfig::default()
        };
        let store = RedisStore::from_config(&config).unwrap();
        assert_eq!(store.endpoint(), "redis://10.1.2.3:6380/");
    }
}
