//! UrlNode - クロール対象の保存形式
//!
//! producer が push し、consumer が pop するのがこのレコード。
//! ここから 2 つのキーを導出する:
//! - **identity**: 正規化 URL（base URL + 名前順の `k=v`）のハッシュ。dedup に使う
//! - **pattern key**: 構造（base URL + パラメータ *名*）のハッシュ。spider の選択に使う
//!
//! どちらも SHA-256 ベースなので、プロセスやビルドが違っても同じ値になる。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// PatternKey は [`UrlNode`] の構造による分類
///
/// パラメータの *値* だけが違うレコードは同じ pattern key を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternKey(u64);

impl PatternKey {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// UrlNode は 1 件のクロール対象
///
/// # 実装
/// - `params` は `BTreeMap`: 反復順（導出キーとワイヤ形式）が挿入順に依存しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlNode {
    base_url: String,
    params: BTreeMap<String, String>,
}

impl UrlNode {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            params: BTreeMap::new(),
        }
    }

    /// builder 形式でパラメータを追加
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// 正規化 URL: `base_url?k1=v1&k2=v2`（パラメータは名前順）
    pub fn to_url(&self) -> String {
        if self.params.is_empty() {
            return self.base_url.clone();
        }
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.base_url, query)
    }

    /// dedup 用の identity（正規化 URL の SHA-256 を hex にしたもの）
    pub fn identity(&self) -> String {
        hex::encode(Sha256::digest(self.to_url().as_bytes()))
    }

    pub fn pattern_key(&self) -> PatternKey {
        let mut hasher = Sha256::new();
        hasher.update(self.base_url.as_bytes());
        for name in self.params.keys() {
            // NUL は URL に現れないので区切りとして曖昧さがない
            hasher.update([0u8]);
            hasher.update(name.as_bytes());
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        PatternKey(u64::from_be_bytes(head))
    }
}

impl fmt::Display for UrlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}
