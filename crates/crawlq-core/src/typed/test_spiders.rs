//! Spiders shared by unit tests.

use async_trait::async_trait;

use super::Spider;
use crate::domain::{CrawlError, UrlNode};

pub const ARTICLE_URL: &str = "https://news.example.com/article";
pub const SEARCH_URL: &str = "https://news.example.com/search";

pub fn article(id: &str) -> UrlNode {
    UrlNode::new(ARTICLE_URL).with_param("id", id)
}

pub fn search(q: &str, page: &str) -> UrlNode {
    UrlNode::new(SEARCH_URL).with_param("q", q).with_param("page", page)
}

#[derive(Debug)]
pub struct ArticleSpider {
    pub id: String,
}

#[async_trait]
impl Spider for ArticleSpider {
    const NAME: &'static str = "test.article";

    fn from_node(node: &UrlNode) -> Option<Self> {
        if node.base_url() != ARTICLE_URL {
            return None;
        }
        node.param("id").map(|id| Self { id: id.to_string() })
    }

    fn to_node(&self) -> UrlNode {
        article(&self.id)
    }

    async fn crawl(&self) -> Result<(), CrawlError> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct SearchSpider {
    pub q: String,
    pub page: u32,
}

#[async_trait]
impl Spider for SearchSpider {
    const NAME: &'static str = "test.search";

    fn from_node(node: &UrlNode) -> Option<Self> {
        if node.base_url() != SEARCH_URL {
            return None;
        }
        let q = node.param("q")?.to_string();
        let page = node.param("page")?.parse().ok()?;
        Some(Self { q, page })
    }

    fn to_node(&self) -> UrlNode {
        search(&self.q, &self.page.to_string())
    }

    async fn crawl(&self) -> Result<(), CrawlError> {
        Ok(())
    }
}

/// Accepts anything.
#[derive(Debug)]
pub struct CatchAllSpider {
    pub node: UrlNode,
}

#[async_trait]
impl Spider for CatchAllSpider {
    const NAME: &'static str = "test.catch_all";

    fn from_node(node: &UrlNode) -> Option<Self> {
        Some(Self { node: node.clone() })
    }

    fn to_node(&self) -> UrlNode {
        self.node.clone()
    }

    async fn crawl(&self) -> Result<(), CrawlError> {
        Err(CrawlError::permanent("catch-all never crawls"))
    }
}
