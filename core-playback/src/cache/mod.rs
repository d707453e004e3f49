//! # Asset Cache
//!
//! In-process [`CacheStore`](bridge_traits::CacheStore) for completed static
//! assets, keyed by absolute URL.
//!
//! Hosts with persistent storage provide their own store; this one keeps
//! assets in memory under an LRU policy bounded by entry count and total
//! bytes.
//!
//! ```rust,ignore
//! use core_playback::cache::{MemoryCacheConfig, MemoryCacheStore};
//!
//! let store = MemoryCacheStore::new(MemoryCacheConfig::default().with_max_bytes(32 * 1024 * 1024));
//! ```

pub mod config;
pub mod memory;
pub mod stats;

pub use config::MemoryCacheConfig;
pub use memory::MemoryCacheStore;
pub use stats::CacheStats;
