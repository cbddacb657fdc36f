//! JobQueue - dedup, enqueue and the bounded dequeue loop over a shared store.
//!
//! Dequeue runs this state machine, popping at most `max_retry` records per call:
//!
//! ```text
//! pop ──empty──────────────────────────────────────────▶ None
//!  │
//! decode ──fail──▶ drop record ───────────────▶ next attempt
//!  │
//! pattern known unresolvable ──▶ re-push ─────▶ next attempt
//!  │
//! cache hit / registry scan ──no match──▶ mark unresolvable, re-push ─▶ next attempt
//!  │
//! build task ──▶ Some(Job)
//! ```
//!
//! Decode failures are permanent (the record is garbage) so the record is
//! dropped. Resolution failures are local to this process, so the record goes
//! back to the shared list where another worker may pick it up.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::job::Job;
use super::resolver::{Lookup, PatternResolver};
use crate::config::QueueConfig;
use crate::domain::{QueueError, UrlNode};
use crate::observability::QueueStats;
use crate::ports::{IdGenerator, ListStore, SystemClock, UlidGenerator};
use crate::typed::{CrawlTask, HandlerRegistry, RecordCodec};

/// One pass of the dequeue loop.
enum Step {
    Empty,
    Ready(Job),
    Retry,
}

pub struct JobQueue {
    store: Arc<dyn ListStore>,
    config: QueueConfig,
    ids: Arc<dyn IdGenerator>,
    // Coarse lock: serializes every enqueue and dequeue of this process and
    // guards the pattern caches.
    resolver: Mutex<PatternResolver>,
}

impl JobQueue {
    /// Build a queue and probe the store once.
    ///
    /// An unreachable store is fatal: the error is returned and no queue exists.
    pub async fn connect(
        store: Arc<dyn ListStore>,
        registry: HandlerRegistry,
        config: QueueConfig,
    ) -> Result<Self, QueueError> {
        config.validate()?;

        let endpoint = store.endpoint();
        if let Err(source) = store.ping().await {
            error!(%endpoint, error = %source, "job store is not reachable");
            return Err(QueueError::StoreUnreachable { endpoint, source });
        }
        info!(
            %endpoint,
            queue = %config.queue_key,
            spiders = registry.len(),
            "job queue connected"
        );

        let resolver = PatternResolver::new(registry, config.max_unresolved_patterns);
        Ok(Self {
            store,
            config,
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            resolver: Mutex::new(resolver),
        })
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Enqueue a record.
    ///
    /// With `fresh`, the record's dedup key is checked (unless duplicates are
    /// allowed) and then marked. Returns `false` when enqueue is disabled, the
    /// record is a rejected duplicate, or the store failed.
    ///
    /// The exists/set pair is not atomic across processes: two workers can both
    /// pass the check and push the same record. That race is accepted.
    pub async fn enqueue_new(&self, node: &UrlNode, fresh: bool) -> bool {
        if !self.config.enable_put {
            return false;
        }
        let _guard = self.resolver.lock().await;
        match self.try_enqueue_new(node, fresh).await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(url = %node, error = %e, "enqueue failed");
                false
            }
        }
    }

    /// Enqueue the record a running task was built from.
    pub async fn enqueue_task(&self, task: &dyn CrawlTask, fresh: bool) -> bool {
        self.enqueue_new(&task.node(), fresh).await
    }

    /// Push a record back without any dedup check.
    ///
    /// For work that was already taken from the queue and has to be restored,
    /// e.g. a dequeued job a worker could not run before shutting down.
    pub async fn enqueue_requeue(&self, node: &UrlNode) -> bool {
        let _guard = self.resolver.lock().await;
        let pushed = match RecordCodec::encode(node) {
            Ok(raw) => self
                .store
                .push(&self.config.queue_key, &raw)
                .await
                .map_err(QueueError::from),
            Err(e) => Err(e.into()),
        };
        match pushed {
            Ok(()) => {
                debug!(url = %node, "record requeued");
                true
            }
            Err(e) => {
                warn!(url = %node, error = %e, "requeue failed");
                false
            }
        }
    }

    /// Pop the next record this process can handle and bind it to its spider.
    ///
    /// `None` means the queue is empty, dequeue is disabled, the store failed,
    /// or `max_retry` records were popped without finding a runnable one.
    pub async fn dequeue(&self) -> Option<Job> {
        if !self.config.enable_get {
            return None;
        }
        let mut resolver = self.resolver.lock().await;

        for attempt in 1..=self.config.max_retry {
            match self.dequeue_once(&mut resolver).await {
                Ok(Step::Ready(job)) => return Some(job),
                Ok(Step::Empty) => {
                    debug!(queue = %self.config.queue_key, attempt, "job queue is empty");
                    return None;
                }
                Ok(Step::Retry) => {}
                Err(e) => {
                    warn!(queue = %self.config.queue_key, error = %e, "dequeue failed");
                    return None;
                }
            }
        }

        info!(
            queue = %self.config.queue_key,
            attempts = self.config.max_retry,
            "no runnable job within retry bound"
        );
        None
    }

    async fn try_enqueue_new(&self, node: &UrlNode, fresh: bool) -> Result<bool, QueueError> {
        let raw = RecordCodec::encode(node)?;

        let key = fresh.then(|| self.dedup_key(node));
        if let Some(key) = &key {
            if !self.config.allow_duplicate_insert && self.store.exists(key).await? {
                debug!(url = %node, "duplicate record rejected");
                return Ok(false);
            }
        }

        // Mark only once the record is stored; a failed push must leave the
        // record enqueueable.
        self.store.push(&self.config.queue_key, &raw).await?;
        if let Some(key) = &key {
            if let Err(e) = self.store.set(key, "true").await {
                warn!(url = %node, error = %e, "record enqueued but dedup key not marked");
            }
        }
        debug!(url = %node, fresh, "record enqueued");
        Ok(true)
    }

    async fn dequeue_once(&self, resolver: &mut PatternResolver) -> Result<Step, QueueError> {
        let Some(raw) = self.store.pop(&self.config.queue_key).await? else {
            return Ok(Step::Empty);
        };

        let node = match RecordCodec::decode(&raw) {
            Ok(node) => node,
            Err(e) => {
                warn!(error = %e, "dropping undecodable record");
                return Ok(Step::Retry);
            }
        };

        let pattern = node.pattern_key();
        let task = match resolver.lookup(pattern, &node) {
            Lookup::Matched(factory, task) => {
                info!(%pattern, spider = factory.name(), "pattern resolved");
                task
            }
            Lookup::Cached(factory) => match factory.probe(&node) {
                Some(task) => task,
                None => {
                    debug!(url = %node, spider = factory.name(), "cached spider declined record");
                    self.push_back(&raw).await?;
                    return Ok(Step::Retry);
                }
            },
            Lookup::NoMatch => {
                info!(%pattern, url = %node, "no spider for pattern in this process");
                self.push_back(&raw).await?;
                return Ok(Step::Retry);
            }
            Lookup::KnownUnresolvable => {
                self.push_back(&raw).await?;
                return Ok(Step::Retry);
            }
        };

        let job = Job::new(self.ids.generate_job_id(), pattern, node, task);
        info!(job_id = %job.id(), spider = job.handler(), url = %job.node(), "job dequeued");
        Ok(Step::Ready(job))
    }

    /// Return a popped raw record to the newest end of the list.
    async fn push_back(&self, raw: &str) -> Result<(), QueueError> {
        if let Err(e) = self.store.push(&self.config.queue_key, raw).await {
            error!(error = %e, record = raw, "failed to return popped record; it is lost");
            return Err(e.into());
        }
        Ok(())
    }

    fn dedup_key(&self, node: &UrlNode) -> String {
        format!("{}{}", self.config.dedup_prefix, node.identity())
    }

    /// Current list length; an advisory snapshot. Store errors read as 0.
    pub async fn size(&self) -> usize {
        match self.store.len(&self.config.queue_key).await {
            Ok(n) => n,
            Err(e) => {
                warn!(queue = %self.config.queue_key, error = %e, "queue length unavailable");
                0
            }
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.size().await == 0
    }

    pub async fn stats(&self) -> QueueStats {
        let pending = self.size().await;
        let resolver = self.resolver.lock().await;
        QueueStats {
            pending,
            resolved_patterns: resolver.resolved_len(),
            unresolved_patterns: resolver.unresolved_len(),
        }
    }

    /// Registry scans performed by this queue so far.
    pub async fn scan_count(&self) -> u64 {
        self.resolver.lock().await.scan_count()
    }
}
