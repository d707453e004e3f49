//! # Player Configuration

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Player configuration.
///
/// Every field has a serde default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Start playback as soon as a resource is attached.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub auto_play: bool,

    /// Look up artwork whenever stream metadata changes.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub enable_artwork: bool,

    /// Requested artwork edge length in pixels.
    ///
    /// Default: 100.
    #[serde(default = "default_artwork_size")]
    pub artwork_size: u32,

    /// Wait between pausing a stalled stream and re-checking it.
    ///
    /// Default: 1000 ms.
    #[serde(default = "default_recovery_grace_period_ms")]
    pub recovery_grace_period_ms: u64,

    /// Write fully downloaded static assets to the cache store.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub cache_completed_assets: bool,

    /// MIME type used when neither the server nor the URL tells.
    ///
    /// Default: `audio/mpeg`.
    #[serde(default = "default_content_type")]
    pub default_content_type: String,

    /// Extra headers sent with every stream request and playability probe.
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_play: true,
            enable_artwork: true,
            artwork_size: default_artwork_size(),
            recovery_grace_period_ms: default_recovery_grace_period_ms(),
            cache_completed_assets: true,
            default_content_type: default_content_type(),
            http_headers: HashMap::new(),
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON document, then validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlaybackError::Config(format!("Invalid player config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Preset for a radio app: no auto-play, larger artwork.
    pub fn manual_start() -> Self {
        Self {
            auto_play: false,
            artwork_size: 600,
            ..Default::default()
        }
    }

    pub fn recovery_grace_period(&self) -> Duration {
        Duration::from_millis(self.recovery_grace_period_ms)
    }

    pub fn with_auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn with_artwork(mut self, enabled: bool) -> Self {
        self.enable_artwork = enabled;
        self
    }

    pub fn with_recovery_grace_period(mut self, period: Duration) -> Self {
        self.recovery_grace_period_ms = period.as_millis() as u64;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.artwork_size == 0 || self.artwork_size > 3000 {
            return Err(PlaybackError::Config(
                "artwork_size must be between 1 and 3000".to_string(),
            ));
        }

        if self.recovery_grace_period_ms > 60_000 {
            return Err(PlaybackError::Config(
                "recovery_grace_period_ms cannot exceed 60000".to_string(),
            ));
        }

        if !self.default_content_type.contains('/') {
            return Err(PlaybackError::Config(format!(
                "default_content_type '{}' is not a MIME type",
                self.default_content_type
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_artwork_size() -> u32 {
    100
}

fn default_recovery_grace_period_ms() -> u64 {
    1000
}

fn default_content_type() -> String {
    "audio/mpeg".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert!(config.auto_play);
        assert!(config.enable_artwork);
        assert_eq!(config.artwork_size, 100);
        assert_eq!(config.recovery_grace_period(), Duration::from_secs(1));
        assert!(config.cache_completed_assets);
        assert_eq!(config.default_content_type, "audio/mpeg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PlayerConfig::from_json_str(
            r#"{"auto_play": false, "http_headers": {"Icy-MetaData": "1"}}"#,
        )
        .unwrap();
        assert!(!config.auto_play);
        assert_eq!(config.artwork_size, 100);
        assert_eq!(config.http_headers.get("Icy-MetaData"), Some(&"1".to_string()));
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(PlayerConfig::from_json_str(r#"{"artwork_size": 0}"#).is_err());
        assert!(PlayerConfig::from_json_str(r#"{"default_content_type": "mpeg"}"#).is_err());
        assert!(PlayerConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_builders_and_presets() {
        let config = PlayerConfig::manual_start()
            .with_recovery_grace_period(Duration::from_millis(250))
            .with_header("User-Agent", "radio")
            .with_artwork(false);
        assert!(!config.auto_play);
        assert!(!config.enable_artwork);
        assert_eq!(config.artwork_size, 600);
        assert_eq!(config.recovery_grace_period_ms, 250);
        assert_eq!(config.http_headers.len(), 1);
        assert!(config.validate().is_ok());
    }
}
