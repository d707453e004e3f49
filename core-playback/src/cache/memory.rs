//! LRU-bounded in-memory asset store

use super::config::MemoryCacheConfig;
use super::stats::CacheStats;
use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::CacheStore;
use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::{debug, trace};

struct Entries {
    lru: LruCache<String, Bytes>,
    stats: CacheStats,
}

/// [`CacheStore`] keeping complete assets in memory.
///
/// Least recently used assets are evicted once either limit of the
/// [`MemoryCacheConfig`] is exceeded. An asset larger than `max_bytes` on
/// its own is never stored.
pub struct MemoryCacheStore {
    config: MemoryCacheConfig,
    entries: Mutex<Entries>,
}

impl MemoryCacheStore {
    pub fn new(config: MemoryCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            entries: Mutex::new(Entries {
                lru: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn config(&self) -> &MemoryCacheConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.lock().stats.clone()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.lru.clear();
        entries.stats.entries = 0;
        entries.stats.total_bytes = 0;
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(MemoryCacheConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> BridgeResult<Option<Bytes>> {
        let mut entries = self.entries.lock();
        let found = entries.lru.get(key).cloned();
        if found.is_some() {
            entries.stats.hits += 1;
        } else {
            entries.stats.misses += 1;
        }
        trace!(key, hit = found.is_some(), "Cache lookup");
        Ok(found)
    }

    async fn put(&self, key: &str, data: Bytes) -> BridgeResult<()> {
        let size = data.len() as u64;
        if size > self.config.max_bytes {
            debug!(key, size, limit = self.config.max_bytes, "Asset too large to cache");
            return Ok(());
        }

        let mut entries = self.entries.lock();
        let Entries { lru, stats } = &mut *entries;

        if let Some((old_key, old)) = lru.push(key.to_string(), data) {
            stats.total_bytes -= old.len() as u64;
            if old_key != key {
                stats.evictions += 1;
            }
        }
        stats.total_bytes += size;

        while stats.total_bytes > self.config.max_bytes {
            match lru.pop_lru() {
                Some((evicted, bytes)) => {
                    trace!(key = %evicted, size = bytes.len(), "Evicted asset");
                    stats.total_bytes -= bytes.len() as u64;
                    stats.evictions += 1;
                }
                None => break,
            }
        }
        stats.entries = lru.len();

        debug!(key, size, entries = stats.entries, total = stats.total_bytes, "Asset cached");
        Ok(())
    }

    async fn contains(&self, key: &str) -> BridgeResult<bool> {
        Ok(self.entries.lock().lru.contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(len: usize) -> Bytes {
        Bytes::from(vec![0u8; len])
    }

    #[tokio::test]
    async fn test_get_put() {
        let store = MemoryCacheStore::default();
        assert_eq!(store.get("http://x/a.mp3").await.unwrap(), None);

        store.put("http://x/a.mp3", bytes(10)).await.unwrap();
        assert_eq!(store.get("http://x/a.mp3").await.unwrap(), Some(bytes(10)));
        assert!(store.contains("http://x/a.mp3").await.unwrap());

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_bytes, 10);
    }

    #[tokio::test]
    async fn test_replace_updates_size() {
        let store = MemoryCacheStore::default();
        store.put("k", bytes(10)).await.unwrap();
        store.put("k", bytes(4)).await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.total_bytes, 4);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test]
    async fn test_entry_limit_evicts_lru() {
        let store = MemoryCacheStore::new(MemoryCacheConfig::new().with_max_entries(2));
        store.put("a", bytes(1)).await.unwrap();
        store.put("b", bytes(1)).await.unwrap();
        store.get("a").await.unwrap();
        store.put("c", bytes(1)).await.unwrap();

        assert!(store.contains("a").await.unwrap());
        assert!(!store.contains("b").await.unwrap());
        assert!(store.contains("c").await.unwrap());
        assert_eq!(store.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_byte_limit_evicts_until_under() {
        let store = MemoryCacheStore::new(MemoryCacheConfig::new().with_max_bytes(100));
        store.put("a", bytes(40)).await.unwrap();
        store.put("b", bytes(40)).await.unwrap();
        store.put("c", bytes(40)).await.unwrap();

        assert!(!store.contains("a").await.unwrap());
        assert_eq!(store.stats().total_bytes, 80);

        store.put("huge", bytes(101)).await.unwrap();
        assert!(!store.contains("huge").await.unwrap());
        assert_eq!(store.stats().entries, 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryCacheStore::default();
        store.put("a", bytes(3)).await.unwrap();
        store.clear();
        assert!(!store.contains("a").await.unwrap());
        assert_eq!(store.stats().total_bytes, 0);
    }
}
