//! Queue module: the job queue, its pattern caches, and the jobs it hands out.

mod job;
mod job_queue;
mod resolver;

pub use job::Job;
pub use job_queue::JobQueue;
pub use resolver::{Lookup, PatternResolver};
