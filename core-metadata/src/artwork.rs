//! Stream metadata parsing and the artwork lookup contract.
//!
//! Radio streams announce the current song as a single inline string,
//! usually formatted `"Artist - Title"`. The player forwards that string
//! verbatim and asks an [`ArtworkLookup`] for a matching cover image.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::artwork::{ArtworkLookup, CachedArtworkLookup, StreamMetadata};
//! use core_metadata::providers::ItunesArtworkClient;
//! use std::sync::Arc;
//!
//! let lookup = CachedArtworkLookup::new(Arc::new(ItunesArtworkClient::new(http)), 64);
//! let metadata = StreamMetadata::parse("Daft Punk - One More Time");
//! let url = lookup.lookup(&metadata.raw, 600).await?;
//! ```

use crate::error::Result;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

const ARTIST_TITLE_SEPARATOR: &str = " - ";

/// Inline stream metadata, raw and parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Value exactly as announced by the stream
    pub raw: String,
    pub artist: Option<String>,
    pub title: Option<String>,
}

impl StreamMetadata {
    /// Split `raw` on the first `" - "` into artist and title.
    ///
    /// Without a separator the whole (trimmed) string is the title. Empty
    /// halves are dropped.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (artist, title) = match raw.split_once(ARTIST_TITLE_SEPARATOR) {
            Some((artist, title)) => (non_empty(artist), non_empty(title)),
            None => (None, non_empty(&raw)),
        };
        Self { raw, artist, title }
    }

    /// Whether the raw value carries anything worth looking up.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Search query for artwork providers: "artist title" when both are
    /// known, otherwise the trimmed raw value.
    pub fn search_term(&self) -> String {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => format!("{} {}", artist, title),
            _ => self.raw.trim().to_string(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Remote artwork lookup.
///
/// Best-effort: callers treat an `Err` the same as `Ok(None)`.
#[async_trait]
pub trait ArtworkLookup: Send + Sync {
    /// Find an artwork URL for `query` at roughly `size`×`size` pixels.
    ///
    /// The player passes [`StreamMetadata::search_term`], i.e. "artist title"
    /// when the raw string parsed, not the raw metadata itself.
    async fn lookup(&self, query: &str, size: u32) -> Result<Option<String>>;
}

/// Memoizes lookup results (hits and misses) in an LRU keyed by query and
/// size. Errors are not cached.
pub struct CachedArtworkLookup {
    inner: Arc<dyn ArtworkLookup>,
    cache: Mutex<LruCache<(String, u32), Option<String>>>,
}

impl CachedArtworkLookup {
    pub fn new(inner: Arc<dyn ArtworkLookup>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

#[async_trait]
impl ArtworkLookup for CachedArtworkLookup {
    async fn lookup(&self, query: &str, size: u32) -> Result<Option<String>> {
        let key = (query.to_string(), size);
        if let Some(hit) = self.cache.lock().get(&key) {
            debug!(query, "Artwork lookup served from cache");
            return Ok(hit.clone());
        }

        let result = self.inner.lookup(query, size).await?;
        self.cache.lock().put(key, result.clone());
        Ok(result)
    }
}
