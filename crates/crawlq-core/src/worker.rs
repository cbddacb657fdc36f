use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::queue::JobQueue;

/// Worker group handle.
/// - `request_shutdown()` で各ワーカーは実行中の Job の後に止まる
/// - `shutdown_and_join()` で全ワーカーの終了も待てる
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// `queue` から取り出す `n` 個のワーカーを起動する。
    /// キューが空のときは `poll_interval` だけ待つ
    pub fn spawn(n: usize, queue: Arc<JobQueue>, poll_interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let q = Arc::clone(&queue);
            let rx = shutdown_rx.clone();
            joins.push(tokio::spawn(worker_loop(worker_id, q, poll_interval, rx)));
        }

        Self { shutdown_tx, joins }
    }

    /// 実行中の Job はキャンセルしない
    pub fn request_shutdown(&self) {
        // receiver はすでに drop されているかもしれない
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for j in self.joins {
            let _ = j.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<JobQueue>,
    poll_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(worker_id, "worker started");
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // dequeue は shutdown と select しない。途中で drop すると
        // pop 済みで push し直す前のレコードを失う
        let Some(job) = queue.dequeue().await else {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }
            continue;
        };

        if *shutdown_rx.borrow() {
            info!(worker_id, job_id = %job.id(), "shutting down, returning job to queue");
            if !queue.enqueue_requeue(job.node()).await {
                warn!(worker_id, job_id = %job.id(), url = %job.node(), "job could not be returned");
            }
            break;
        }

        match job.run().await {
            Ok(()) => info!(worker_id, job_id = %job.id(), spider = job.handler(), "job finished"),
            Err(e) => warn!(
                worker_id,
                job_id = %job.id(),
                spider = job.handler(),
                kind = ?e.kind(),
                error = %e,
                "job failed"
            ),
        }
    }
    info!(worker_id, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::config::QueueConfig;
    use crate::domain::{CrawlError, UrlNode};
    use crate::impls::InMemoryStore;
    use crate::typed::test_spiders::{ARTICLE_URL, article};
    use crate::typed::{CrawlTask, HandlerRegistry, SpiderFactory};

    #[derive(Debug)]
    struct CountingTask {
        node: UrlNode,
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CrawlTask for CountingTask {
        fn name(&self) -> &str {
            "test.counting"
        }

        fn node(&self) -> UrlNode {
            self.node.clone()
        }

        async fn run(&self) -> Result<(), CrawlError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct CountingFactory {
        runs: Arc<AtomicUsize>,
    }

    impl SpiderFactory for CountingFactory {
        fn name(&self) -> &str {
            "test.counting"
        }

        fn probe(&self, node: &UrlNode) -> Option<Box<dyn CrawlTask>> {
            (node.base_url() == ARTICLE_URL).then(|| {
                Box::new(CountingTask {
                    node: node.clone(),
                    runs: Arc::clone(&self.runs),
                }) as Box<dyn CrawlTask>
            })
        }
    }

    #[tokio::test]
    async fn workers_drain_queue_and_stop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry
            .register_factory(Arc::new(CountingFactory { runs: Arc::clone(&runs) }))
            .unwrap();
        let store = Arc::new(InMemoryStore::new());
        let queue = Arc::new(
            JobQueue::connect(store, registry, QueueConfig::default())
                .await
                .unwrap(),
        );
        for n in 0..10 {
            assert!(queue.enqueue_new(&article(&n.to_string()), true).await);
        }

        let group = WorkerGroup::spawn(3, Arc::clone(&queue), Duration::from_millis(10));
        for _ in 0..200 {
            if runs.load(Ordering::SeqCst) == 10 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        group.shutdown_and_join().await;

        assert_eq!(runs.load(Ordering::SeqCst), 10);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn shutdown_stops_idle_workers() {
        let store = Arc::new(InMemoryStore::new());
        let queue = Arc::new(
            JobQueue::connect(store, HandlerRegistry::new(), QueueConfig::default())
                .await
                .unwrap(),
        );
        let group = WorkerGroup::spawn(2, queue, Duration::from_secs(60));

        tokio::time::timeout(Duration::from_secs(5), group.shutdown_and_join())
            .await
            .unwrap();
    }
}
