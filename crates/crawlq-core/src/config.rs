//! Queue configuration.
//!
//! Defaults suit a single local Redis. Every option can be overridden from the
//! environment with a `CRAWLQ_` prefixed variable (see [`QueueConfig::from_env`]).

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUEUE_KEY: &str = "crawlq:jobs";
pub const DEFAULT_DEDUP_PREFIX: &str = "crawlq:seen:";
pub const DEFAULT_MAX_RETRY: u32 = 30;
pub const DEFAULT_MAX_UNRESOLVED_PATTERNS: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("max_retry must be at least 1")]
    ZeroMaxRetry,

    #[error("queue_key must not be empty")]
    EmptyQueueKey,

    #[error("max_unresolved_patterns must be at least 1 (omit it for no cap)")]
    ZeroUnresolvedCap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Gate for every enqueue of new work.
    pub enable_put: bool,
    /// Gate for every dequeue.
    pub enable_get: bool,
    /// When false, a fresh record whose dedup key exists is rejected.
    pub allow_duplicate_insert: bool,
    pub redis_host: String,
    pub redis_port: u16,
    /// Upper bound on records popped by one `dequeue` call.
    pub max_retry: u32,
    pub queue_key: String,
    pub dedup_prefix: String,
    /// Cap on the per-process set of unresolvable patterns; `None` is unbounded,
    /// `Some(0)` is rejected.
    pub max_unresolved_patterns: Option<usize>,
    pub poll_interval_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enable_put: true,
            enable_get: true,
            allow_duplicate_insert: false,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            max_retry: DEFAULT_MAX_RETRY,
            queue_key: DEFAULT_QUEUE_KEY.to_string(),
            dedup_prefix: DEFAULT_DEDUP_PREFIX.to_string(),
            max_unresolved_patterns: Some(DEFAULT_MAX_UNRESOLVED_PATTERNS),
            poll_interval_ms: 500,
        }
    }
}

impl QueueConfig {
    /// Defaults overlaid with `CRAWLQ_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        overlay(&lookup, "CRAWLQ_ENABLE_PUT", &mut config.enable_put)?;
        overlay(&lookup, "CRAWLQ_ENABLE_GET", &mut config.enable_get)?;
        overlay(
            &lookup,
            "CRAWLQ_ALLOW_DUPLICATE_INSERT",
            &mut config.allow_duplicate_insert,
        )?;
        overlay(&lookup, "CRAWLQ_REDIS_HOST", &mut config.redis_host)?;
        overlay(&lookup, "CRAWLQ_REDIS_PORT", &mut config.redis_port)?;
        overlay(&lookup, "CRAWLQ_MAX_RETRY", &mut config.max_retry)?;
        overlay(&lookup, "CRAWLQ_QUEUE_KEY", &mut config.queue_key)?;
        overlay(&lookup, "CRAWLQ_DEDUP_PREFIX", &mut config.dedup_prefix)?;
        overlay(&lookup, "CRAWLQ_POLL_INTERVAL_MS", &mut config.poll_interval_ms)?;

        // "none" lifts the cap.
        if let Some(raw) = lookup("CRAWLQ_MAX_UNRESOLVED") {
            config.max_unresolved_patterns = match raw.trim() {
                "none" => None,
                other => Some(parse("CRAWLQ_MAX_UNRESOLVED", other)?),
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retry == 0 {
            return Err(ConfigError::ZeroMaxRetry);
        }
        if self.queue_key.is_empty() {
            return Err(ConfigError::EmptyQueueKey);
        }
        if self.max_unresolved_patterns == Some(0) {
            return Err(ConfigError::ZeroUnresolvedCap);
        }
        Ok(())
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn overlay<F, T>(lookup: &F, name: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = lookup(name) {
        *slot = parse(name, raw.trim())?;
    }
    Ok(())
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
