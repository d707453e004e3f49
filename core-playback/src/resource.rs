//! What the player is asked to play.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A URL plus its caching policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum Resource {
    /// Endless stream; never read from or written to the cache.
    LiveFeed(String),
    /// Finite file; looked up in and written back to the cache.
    StaticAsset(String),
}

impl Resource {
    pub fn url(&self) -> &str {
        match self {
            Resource::LiveFeed(url) | Resource::StaticAsset(url) => url,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Resource::LiveFeed(_))
    }

    /// Key under which the asset is cached; `None` for live feeds.
    pub fn cache_key(&self) -> Option<&str> {
        match self {
            Resource::StaticAsset(url) => Some(url),
            Resource::LiveFeed(_) => None,
        }
    }

    /// MIME type implied by the URL's file extension, if recognizable.
    pub fn content_type_hint(&self) -> Option<&'static str> {
        let path = self.url().split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        let (_, ext) = file.rsplit_once('.')?;

        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some("audio/mpeg"),
            "aac" => Some("audio/aac"),
            "m4a" | "mp4" => Some("audio/mp4"),
            "ogg" | "oga" | "opus" => Some("audio/ogg"),
            "flac" => Some("audio/flac"),
            "wav" => Some("audio/wav"),
            "m3u8" => Some("application/vnd.apple.mpegurl"),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::LiveFeed(url) => write!(f, "live:{}", url),
            Resource::StaticAsset(url) => write!(f, "static:{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_only_for_static_assets() {
        assert_eq!(
            Resource::StaticAsset("http://x/a.mp3".into()).cache_key(),
            Some("http://x/a.mp3")
        );
        assert_eq!(Resource::LiveFeed("http://x/live".into()).cache_key(), None);
        assert!(Resource::LiveFeed("http://x/live".into()).is_live());
    }

    #[test]
    fn test_content_type_hint() {
        let hint = |url: &str| Resource::StaticAsset(url.to_string()).content_type_hint();
        assert_eq!(hint("http://x/a.mp3"), Some("audio/mpeg"));
        assert_eq!(hint("http://x/a.FLAC?sig=1"), Some("audio/flac"));
        assert_eq!(hint("http://x/track.m4a#t=3"), Some("audio/mp4"));
        assert_eq!(hint("http://x/stream"), None);
        assert_eq!(hint("http://x.example/"), None);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Resource::LiveFeed("http://x/live".into())).unwrap();
        assert_eq!(json, r#"{"kind":"live_feed","url":"http://x/live"}"#);
    }
}
