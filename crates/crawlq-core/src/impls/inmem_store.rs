//! InMemoryStore - 開発・テスト用のプロセス内 ListStore
//!
//! Redis と同じ構成: 文字列キーと名前付きリスト。
//! リストは新しい値を先頭に入れ（LPUSH）、末尾から取り出す（RPOP）ので FIFO になる。

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{ListStore, StoreError};

#[derive(Default)]
struct Inner {
    keys: HashMap<String, String>,
    lists: HashMap<String, VecDeque<String>>,
}

/// InMemoryStore は開発用のストア
///
/// # 実装詳細
/// - HashMap で文字列キーとリストを管理
/// - Mutex で排他制御
/// - `set_offline(true)` で全プリミティブが接続エラーになる（ストア障害のシミュレーション）
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// `key` に保存された値
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.keys.get(key).cloned())
    }

    /// `list` の中身（古い順）
    pub fn snapshot(&self, list: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .lists
            .get(list)
            .map(|q| q.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("in-memory store is offline".to_string()));
        }
        self.inner
            .lock()
            .map_err(|_| StoreError::Command("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ListStore for InMemoryStore {
    fn endpoint(&self) -> String {
        "memory://local".to_string()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.keys.contains_key(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.keys.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?
            .lists
            .entry(list.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.lists.get_mut(list).and_then(VecDeque::pop_back))
    }

    async fn len(&self, list: &str) -> Result<usize, StoreError> {
        Ok(self.lock()?.lists.get(list).map_or(0, VecDeque::len))
    }
}
