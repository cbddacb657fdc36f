//! Logging setup and queue status views.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Snapshot of one queue as seen from this process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Records in the shared list (advisory).
    pub pending: usize,
    /// Patterns this process has bound to a spider.
    pub resolved_patterns: usize,
    /// Patterns this process knows it cannot handle.
    pub unresolved_patterns: usize,
}
