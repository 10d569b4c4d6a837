use crate::aggregator::Verdict;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Clone, Debug)]
struct CacheEntry {
    verdict: Verdict,
    created_at: Instant,
}

/// In-memory verdict cache keyed by document identifier (source URL).
///
/// Entries expire lazily: a lookup older than the expiration window is a
/// miss and evicts the stale entry. The map is capacity-bounded; inserting
/// at capacity drops the oldest entry. Safe to share across concurrent
/// analyses: a same-key race is last-write-wins, which is harmless since
/// identical input produces an identical verdict.
pub struct AnalysisCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    expiration: Duration,
    max_entries: usize,
}

impl AnalysisCache {
    pub fn new(expiration: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiration,
            max_entries: max_entries.max(1),
        }
    }

    /// Get a cached verdict if present and not expired.
    pub async fn get(&self, key: &str) -> Option<Verdict> {
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.created_at.elapsed() < self.expiration => {
                Some(entry.verdict.clone())
            }
            Some(_) => {
                debug!(key, "evicting expired cache entry");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a verdict, evicting the oldest entry at capacity.
    pub async fn insert(&self, key: &str, verdict: Verdict) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                debug!(key = %oldest, "cache full, evicting oldest entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                verdict,
                created_at: Instant::now(),
            },
        );
    }

    /// Clear the entire cache.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;

    fn verdict() -> Verdict {
        aggregate(&[])
    }

    #[tokio::test]
    async fn insert_then_get_returns_the_verdict() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 16);

        cache.insert("https://site.example/tos", verdict()).await;
        let hit = cache.get("https://site.example/tos").await;

        assert_eq!(hit, Some(verdict()));
    }

    #[tokio::test]
    async fn missing_key_is_a_miss() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 16);
        assert!(cache.get("https://other.example/tos").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_misses_and_evicted() {
        let cache = AnalysisCache::new(Duration::from_millis(20), 16);

        cache.insert("https://site.example/tos", verdict()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(cache.get("https://site.example/tos").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn capacity_evicts_the_oldest_entry() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 2);

        cache.insert("first", verdict()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("second", verdict()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("third", verdict()).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("first").await.is_none());
        assert!(cache.get("second").await.is_some());
        assert!(cache.get("third").await.is_some());
    }

    #[tokio::test]
    async fn reinserting_an_existing_key_does_not_evict_others() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 2);

        cache.insert("first", verdict()).await;
        cache.insert("second", verdict()).await;
        cache.insert("second", verdict()).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("first").await.is_some());
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 16);

        cache.insert("first", verdict()).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
    }
}
