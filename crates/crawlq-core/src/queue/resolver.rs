//! PatternResolver - process-local pattern caches over the handler registry.
//!
//! Two caches, both living as long as the owning `JobQueue`:
//! - **resolved**: pattern -> factory that accepted a record of that pattern
//! - **unresolved**: patterns no registered factory accepted in this process
//!
//! A pattern is never in both. The unresolved set only says "not here": another
//! process with a different registry may well handle the record, which is why
//! such records go back to the shared queue instead of being dropped.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::domain::{PatternKey, UrlNode};
use crate::typed::{CrawlTask, HandlerRegistry, SpiderFactory};

/// Result of looking a record up.
pub enum Lookup {
    /// Pattern is in the unresolved set; no probe was run.
    KnownUnresolvable,
    /// Pattern is cached; the task still has to be built from this record.
    Cached(Arc<dyn SpiderFactory>),
    /// Registry scan matched; the winning probe already built the task.
    Matched(Arc<dyn SpiderFactory>, Box<dyn CrawlTask>),
    /// Registry scan found nothing; the pattern is now in the unresolved set.
    NoMatch,
}

pub struct PatternResolver {
    registry: HandlerRegistry,
    resolved: HashMap<PatternKey, Arc<dyn SpiderFactory>>,
    unresolved: HashSet<PatternKey>,
    // insertion order, for eviction
    unresolved_order: VecDeque<PatternKey>,
    max_unresolved: Option<usize>,
    scans: u64,
}

impl PatternResolver {
    pub fn new(registry: HandlerRegistry, max_unresolved: Option<usize>) -> Self {
        Self {
            registry,
            resolved: HashMap::new(),
            unresolved: HashSet::new(),
            unresolved_order: VecDeque::new(),
            max_unresolved,
            scans: 0,
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn is_unresolvable(&self, pattern: PatternKey) -> bool {
        self.unresolved.contains(&pattern)
    }

    pub fn cached(&self, pattern: PatternKey) -> Option<Arc<dyn SpiderFactory>> {
        self.resolved.get(&pattern).cloned()
    }

    /// Resolve `node` (whose pattern key is `pattern`), scanning the registry
    /// only on a cache miss.
    pub fn lookup(&mut self, pattern: PatternKey, node: &UrlNode) -> Lookup {
        if self.is_unresolvable(pattern) {
            return Lookup::KnownUnresolvable;
        }
        if let Some(factory) = self.cached(pattern) {
            return Lookup::Cached(factory);
        }

        self.scans += 1;
        match self.registry.resolve(node) {
            Some(resolved) => {
                self.resolved.insert(pattern, Arc::clone(&resolved.factory));
                Lookup::Matched(resolved.factory, resolved.task)
            }
            None => {
                self.mark_unresolvable(pattern);
                Lookup::NoMatch
            }
        }
    }

    fn mark_unresolvable(&mut self, pattern: PatternKey) {
        debug_assert!(!self.resolved.contains_key(&pattern));
        if !self.unresolved.insert(pattern) {
            return;
        }
        self.unresolved_order.push_back(pattern);

        if let Some(cap) = self.max_unresolved {
            while self.unresolved.len() > cap {
                let Some(oldest) = self.unresolved_order.pop_front() else {
                    break;
                };
                self.unresolved.remove(&oldest);
                tracing::debug!(pattern = %oldest, "evicted unresolvable pattern");
            }
        }
    }

    pub fn resolved_len(&self) -> usize {
        self.resolved.len()
    }

    pub fn unresolved_len(&self) -> usize {
        self.unresolved.len()
    }

    /// Number of registry scans performed so far.
    pub fn scan_count(&self) -> u64 {
        self.scans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::Spider;
    use crate::typed::test_spiders::{ArticleSpider, SearchSpider, article, search};

    fn resolver(max_unresolved: Option<usize>) -> PatternResolver {
        let mut registry = HandlerRegistry::new();
        registry.register::<ArticleSpider>().unwrap();
        PatternResolver::new(registry, max_unresolved)
    }

    fn other(n: usize) -> UrlNode {
        UrlNode::new(format!("https://elsewhere.example.com/{n}"))
    }

    #[test]
    fn miss_scans_then_hit_uses_cache() {
        let mut resolver = resolver(None);
        let first = article("1");
        let second = article("2");

        assert!(matches!(
            resolver.lookup(first.pattern_key(), &first),
            Lookup::Matched(f, _) if f.name() == ArticleSpider::NAME
        ));
        assert_eq!(resolver.scan_count(), 1);

        assert!(matches!(
            resolver.lookup(second.pattern_key(), &second),
            Lookup::Cached(f) if f.name() == ArticleSpider::NAME
        ));
        assert_eq!(resolver.scan_count(), 1);
        assert_eq!(resolver.resolved_len(), 1);
    }

    #[test]
    fn no_match_is_negative_cached() {
        let mut resolver = resolver(None);
        let node = search("rust", "1");
        let pattern = node.pattern_key();

        assert!(matches!(resolver.lookup(pattern, &node), Lookup::NoMatch));
        assert!(resolver.is_unresolvable(pattern));
        assert!(resolver.cached(pattern).is_none());

        assert!(matches!(
            resolver.lookup(pattern, &search("go", "2")),
            Lookup::KnownUnresolvable
        ));
        assert_eq!(resolver.scan_count(), 1);
    }

    #[test]
    fn pattern_never_in_both_caches() {
        let mut registry = HandlerRegistry::new();
        registry.register::<ArticleSpider>().unwrap();
        registry.register::<SearchSpider>().unwrap();
        let mut resolver = PatternResolver::new(registry, None);

        let nodes = [article("1"), search("a", "1"), other(1), article("2"), other(1)];
        for node in &nodes {
            resolver.lookup(node.pattern_key(), node);
        }
        for node in &nodes {
            let p = node.pattern_key();
            assert!(!(resolver.is_unresolvable(p) && resolver.cached(p).is_some()));
        }
        assert_eq!(resolver.resolved_len(), 2);
        assert_eq!(resolver.unresolved_len(), 1);
    }

    #[test]
    fn unresolved_set_evicts_oldest_at_cap() {
        let mut resolver = resolver(Some(2));
        for n in 0..3 {
            let node = other(n);
            resolver.lookup(node.pattern_key(), &node);
        }

        assert_eq!(resolver.unresolved_len(), 2);
        assert!(!resolver.is_unresolvable(other(0).pattern_key()));
        assert!(resolver.is_unresolvable(other(1).pattern_key()));
        assert!(resolver.is_unresolvable(other(2).pattern_key()));
    }

    #[test]
    fn unbounded_set_keeps_everything() {
        let mut resolver = resolver(None);
        for n in 0..50 {
            let node = other(n);
            resolver.lookup(node.pattern_key(), &node);
        }
        assert_eq!(resolver.unresolved_len(), 50);
    }
}
