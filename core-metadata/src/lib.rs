//! # Stream Metadata & Artwork Module
//!
//! Turns the inline metadata of a playing stream into something a
//! now-playing screen can show:
//! - Parsing raw "Artist - Title" strings ([`StreamMetadata`])
//! - The [`ArtworkLookup`] contract used by the player
//! - An LRU-memoizing lookup decorator ([`CachedArtworkLookup`])
//! - A remote provider backed by the iTunes search API
//!   (`artwork-remote` feature)

pub mod artwork;
pub mod error;
pub mod providers;

pub use artwork::{ArtworkLookup, CachedArtworkLookup, StreamMetadata};
pub use error::{MetadataError, Result};
