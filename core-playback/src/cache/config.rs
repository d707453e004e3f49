//! Cache configuration

use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};

/// Limits of the in-memory asset cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryCacheConfig {
    /// Maximum number of cached assets (default: 32)
    pub max_entries: usize,

    /// Maximum total size in bytes (default: 64MB)
    pub max_bytes: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 32,
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

impl MemoryCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, entries: usize) -> Self {
        self.max_entries = entries;
        self
    }

    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(PlaybackError::Config(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if self.max_bytes == 0 {
            return Err(PlaybackError::Config(
                "max_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MemoryCacheConfig::default();
        assert_eq!(config.max_entries, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(MemoryCacheConfig::new().with_max_entries(0).validate().is_err());
        assert!(MemoryCacheConfig::new().with_max_bytes(0).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MemoryCacheConfig = serde_json::from_str(r#"{"max_entries": 4}"#).unwrap();
        assert_eq!(config.max_entries, 4);
        assert_eq!(config.max_bytes, 64 * 1024 * 1024);
    }
}
