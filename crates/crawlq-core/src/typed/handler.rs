//! SpiderFactory - registry に格納する型消去された handler
//!
//! # 学習ポイント
//! - `TypedFactory<S>` で [`Spider`] 型を包み、`Vec<Arc<dyn SpiderFactory>>` に並べられるようにする
//! - `PhantomData<fn() -> S>` で S を所有せずに型だけ保持する

use std::marker::PhantomData;

use super::task::{CrawlTask, Spider};
use crate::domain::UrlNode;

/// SpiderFactory は名前付きの factory probe
pub trait SpiderFactory: Send + Sync {
    fn name(&self) -> &str;

    /// `node` から task を作る。`None` は「担当外」
    fn probe(&self, node: &UrlNode) -> Option<Box<dyn CrawlTask>>;
}

pub struct TypedFactory<S: Spider> {
    _marker: PhantomData<fn() -> S>,
}

impl<S: Spider> TypedFactory<S> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S: Spider> Default for TypedFactory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spider> SpiderFactory for TypedFactory<S> {
    fn name(&self) -> &str {
        S::NAME
    }

    fn probe(&self, node: &UrlNode) -> Option<Box<dyn CrawlTask>> {
        S::from_node(node).map(|spider| Box::new(spider) as Box<dyn CrawlTask>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::test_spiders::{ArticleSpider, article};

    #[tokio::test]
    async fn typed_factory_builds_matching_spider() {
        let factory = TypedFactory::<ArticleSpider>::new();
        assert_eq!(factory.name(), ArticleSpider::NAME);

        let task = factory.probe(&article("7")).unwrap();
        assert_eq!(task.name(), ArticleSpider::NAME);
        assert_eq!(task.node(), article("7"));
        task.run().await.unwrap();
    }

    #[test]
    fn typed_factory_declines_other_shapes() {
        let factory = TypedFactory::<ArticleSpider>::new();
        assert!(factory.probe(&UrlNode::new("https://other.example.com/")).is_none());
    }
}
