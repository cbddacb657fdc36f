//! Spider / CrawlTask - 型付き crawl task
//!
//! [`Spider`] は自分が処理できるレコードを知っている:
//! `from_node` が factory probe で、形の違うレコードには `None` を返す。
//! [`CrawlTask`] は `Job` に入れて渡すための object-safe な形。

use std::fmt;

use async_trait::async_trait;

use crate::domain::{CrawlError, UrlNode};

/// Spider は型付きの crawl task
///
/// # 使用例
/// ```ignore
/// #[derive(Debug)]
/// struct ArticleSpider { id: String }
///
/// #[async_trait]
/// impl Spider for ArticleSpider {
///     const NAME: &'static str = "news.article";
///
///     fn from_node(node: &UrlNode) -> Option<Self> {
///         if node.base_url() != "https://news.example.com/article" {
///             return None;
///         }
///         node.param("id").map(|id| Self { id: id.to_string() })
///     }
///
///     fn to_node(&self) -> UrlNode {
///         UrlNode::new("https://news.example.com/article").with_param("id", &self.id)
///     }
///
///     async fn crawl(&self) -> Result<(), CrawlError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Spider: fmt::Debug + Send + Sync + Sized + 'static {
    /// registry 内で一意な名前
    const NAME: &'static str;

    /// 保存されたレコードから spider を復元する。担当外なら `None`
    fn from_node(node: &UrlNode) -> Option<Self>;

    /// dequeue されたときにこの spider を復元するレコード
    fn to_node(&self) -> UrlNode;

    async fn crawl(&self) -> Result<(), CrawlError>;
}

/// CrawlTask は object-safe な実行可能 task
#[async_trait]
pub trait CrawlTask: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn node(&self) -> UrlNode;

    async fn run(&self) -> Result<(), CrawlError>;
}

#[async_trait]
impl<S: Spider> CrawlTask for S {
    fn name(&self) -> &str {
        S::NAME
    }

    fn node(&self) -> UrlNode {
        self.to_node()
    }

    async fn run(&self) -> Result<(), CrawlError> {
        self.crawl().await
    }
}
