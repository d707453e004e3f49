//! Key-value cache storage abstraction
//!
//! The player only ever reads complete audio assets keyed by their absolute
//! URL string, and writes them back once a static asset has finished
//! downloading. How the bytes are persisted (memory, disk, database) is the
//! implementation's concern.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Abstract get/put cache for downloaded assets.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::CacheStore;
///
/// async fn cached_len(store: &dyn CacheStore, url: &str) -> Option<usize> {
///     store.get(url).await.ok().flatten().map(|bytes| bytes.len())
/// }
/// ```
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the bytes stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss; a miss is never an error.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `data` under `key`, replacing any previous value.
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Check if a key exists without retrieving it
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
