//! Job - a dequeued record bound to the spider that will crawl it.

use crate::domain::{CrawlError, JobId, PatternKey, UrlNode};
use crate::typed::CrawlTask;

/// Runnable unit returned by `JobQueue::dequeue`. The caller owns it.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    pattern: PatternKey,
    node: UrlNode,
    task: Box<dyn CrawlTask>,
}

impl Job {
    pub fn new(id: JobId, pattern: PatternKey, node: UrlNode, task: Box<dyn CrawlTask>) -> Self {
        Self {
            id,
            pattern,
            node,
            task,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn pattern(&self) -> PatternKey {
        self.pattern
    }

    /// The record as it was stored; pass it to `enqueue_requeue` to give the job back.
    pub fn node(&self) -> &UrlNode {
        &self.node
    }

    /// Name of the spider bound to this job.
    pub fn handler(&self) -> &str {
        self.task.name()
    }

    pub fn task(&self) -> &dyn CrawlTask {
        self.task.as_ref()
    }

    pub fn into_task(self) -> Box<dyn CrawlTask> {
        self.task
    }

    pub async fn run(&self) -> Result<(), CrawlError> {
        self.task.run().await
    }
}
