use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::time::{Duration, sleep};
use tracing::info;

use crawlq_core::observability::init_tracing;
use crawlq_core::ports::ListStore;
use crawlq_core::worker::WorkerGroup;
use crawlq_core::{CrawlError, HandlerRegistry, JobQueue, QueueConfig, Spider, UrlNode};

const ARTICLE_URL: &str = "https://news.example.com/article";
const LISTING_URL: &str = "https://news.example.com/list";

/// 記事ページ
#[derive(Debug)]
struct ArticleSpider {
    id: u64,
}

#[async_trait]
impl Spider for ArticleSpider {
    const NAME: &'static str = "news.article";

    fn from_node(node: &UrlNode) -> Option<Self> {
        if node.base_url() != ARTICLE_URL {
            return None;
        }
        let id = node.param("id")?.parse().ok()?;
        Some(Self { id })
    }

    fn to_node(&self) -> UrlNode {
        UrlNode::new(ARTICLE_URL).with_param("id", self.id.to_string())
    }

    async fn crawl(&self) -> Result<(), CrawlError> {
        // 取得とパースは別の場所。デモでは dispatch だけ見せる
        sleep(Duration::from_millis(20)).await;
        info!(id = self.id, "crawled article");
        Ok(())
    }
}

/// 一覧ページ（4 ページ目以降は 404 扱い）
#[derive(Debug)]
struct ListingSpider {
    section: String,
    page: u32,
}

#[async_trait]
impl Spider for ListingSpider {
    const NAME: &'static str = "news.listing";

    fn from_node(node: &UrlNode) -> Option<Self> {
        if node.base_url() != LISTING_URL {
            return None;
        }
        Some(Self {
            section: node.param("section")?.to_string(),
            page: node.param("page")?.parse().ok()?,
        })
    }

    fn to_node(&self) -> UrlNode {
        UrlNode::new(LISTING_URL)
            .with_param("section", &self.section)
            .with_param("page", self.page.to_string())
    }

    async fn crawl(&self) -> Result<(), CrawlError> {
        if self.page > 3 {
            return Err(CrawlError::permanent(format!(
                "{} page {} does not exist",
                self.section, self.page
            )));
        }
        info!(section = %self.section, page = self.page, "crawled listing");
        Ok(())
    }
}

#[cfg(feature = "redis")]
fn open_store(config: &QueueConfig) -> anyhow::Result<Arc<dyn ListStore>> {
    let store = crawlq_core::impls::RedisStore::from_config(config)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
fn open_store(_config: &QueueConfig) -> anyhow::Result<Arc<dyn ListStore>> {
    Ok(Arc::new(crawlq_core::impls::InMemoryStore::new()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // (A) 設定 + ストア + registry（登録順 = 解決順）
    let config = QueueConfig::from_env().context("reading CRAWLQ_* configuration")?;
    let store = open_store(&config)?;

    let mut registry = HandlerRegistry::new();
    registry.register::<ArticleSpider>()?;
    registry.register::<ListingSpider>()?;

    // (B) ストアに繋がらなければここで終了
    let poll_interval = config.poll_interval();
    let queue = Arc::new(
        JobQueue::connect(store, registry, config)
            .await
            .context("starting job queue")?,
    );

    // (C) 投入: 重複、存在しない一覧ページ、誰も処理しない形のレコード
    let seeds = [
        UrlNode::new(ARTICLE_URL).with_param("id", "1"),
        UrlNode::new(ARTICLE_URL).with_param("id", "2"),
        UrlNode::new(ARTICLE_URL).with_param("id", "1"),
        UrlNode::new(LISTING_URL)
            .with_param("section", "world")
            .with_param("page", "1"),
        UrlNode::new(LISTING_URL)
            .with_param("section", "world")
            .with_param("page", "9"),
        UrlNode::new("https://video.example.com/watch").with_param("v", "abc"),
    ];
    for node in &seeds {
        let accepted = queue.enqueue_new(node, true).await;
        info!(url = %node, accepted, "seeded");
    }
    let stats = queue.stats().await;
    info!(?stats, "queue seeded");

    // (D) 数秒間（または ctrl-c まで）処理する
    let workers = WorkerGroup::spawn(2, Arc::clone(&queue), poll_interval);
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
        _ = sleep(Duration::from_secs(2)) => {}
    }
    workers.shutdown_and_join().await;

    let stats = queue.stats().await;
    info!(?stats, "done");
    Ok(())
}
