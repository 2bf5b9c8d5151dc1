//! Short-lived cache of fast-path routing results.
//!
//! Entries are keyed by the lower-cased, length-bounded query plus the last
//! few relevant context turns, so the same words after a different
//! conversation are distinct entries. Staleness is checked lazily on `get`;
//! `sweep` (run periodically by [`ResponseCache::spawn_sweeper`]) drops
//! whatever expired without being read.

use luxroute_config::{CacheConfig, RouterConfig};
use luxroute_core::route::RouteResponse;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry {
    value: RouteResponse,
    created_at: Instant,
}

/// TTL-bounded map of routing results, safe for concurrent readers and writers.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    key_prefix_chars: usize,
    key_turns: usize,
}

impl ResponseCache {
    /// A cache with the given TTL, keyed on the first 50 query characters
    /// and the last two context turns.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            key_prefix_chars: 50,
            key_turns: 2,
        }
    }

    pub fn from_config(cache: &CacheConfig, router: &RouterConfig) -> Self {
        Self::new(Duration::from_secs(cache.ttl_secs))
            .with_key_shape(cache.key_prefix_chars, router.context_key_turns)
    }

    pub fn with_key_shape(mut self, prefix_chars: usize, turns: usize) -> Self {
        self.key_prefix_chars = prefix_chars;
        self.key_turns = turns;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a query and its relevant context turns.
    pub fn key(&self, query: &str, context: &[String]) -> String {
        let prefix: String = query
            .trim()
            .to_lowercase()
            .chars()
            .take(self.key_prefix_chars)
            .collect();
        let start = context.len().saturating_sub(self.key_turns);
        format!("{prefix}:{}", context[start..].join("|"))
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.created_at) <= self.ttl
    }

    /// The cached value, if present and fresh. A stale entry is removed.
    pub async fn get(&self, key: &str) -> Option<RouteResponse> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if self.is_fresh(entry, now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Another writer may have refreshed it between the two locks.
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(key, "Evicted stale cache entry");
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub async fn set(&self, key: impl Into<String>, value: RouteResponse) {
        self.entries.write().await.insert(
            key.into(),
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    /// Remove every stale entry. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.created_at) <= self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Run `sweep` every `every` until the handle is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = self.sweep().await;
                if removed > 0 {
                    debug!(removed, "Cache sweep");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxroute_core::route::{FastPattern, Tier};

    fn response(answer: &str) -> RouteResponse {
        RouteResponse::new(Tier::Fast(FastPattern::TypeOnly), answer)
    }

    fn turns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn set_then_get_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        cache.set("k", response("a")).await;
        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("k").await.unwrap().answer, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn get_after_ttl_evicts() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        cache.set("k", response("a")).await;
        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(cache.get("k").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_and_restarts_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.set("k", response("old")).await;
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", response("new")).await;
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("k").await.unwrap().answer, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_stale_entries() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.set("old", response("a")).await;
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.set("young", response("b")).await;
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.sweep().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("young").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task_runs_periodically() {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(5)));
        cache.set("k", response("a")).await;
        let handle = cache.clone().spawn_sweeper(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(cache.is_empty().await);
        handle.abort();
    }

    #[test]
    fn key_includes_bounded_prefix_and_last_turns() {
        let cache = ResponseCache::new(Duration::from_secs(1));
        let long = "W".repeat(80);
        let key = cache.key(&long, &turns(&["eins", "zwei", "drei"]));
        assert_eq!(key, format!("{}:zwei|drei", "w".repeat(50)));
    }

    #[test]
    fn different_context_gives_different_keys() {
        let cache = ResponseCache::new(Duration::from_secs(1));
        let a = cache.key("Wandleuchte", &turns(&["für draußen"]));
        let b = cache.key("Wandleuchte", &turns(&["fürs Bad"]));
        assert_ne!(a, b);
        assert_eq!(cache.key("  Wandleuchte ", &[]), "wandleuchte:");
    }
}
