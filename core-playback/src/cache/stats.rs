//! Cache statistics

use serde::{Deserialize, Serialize};

/// Counters of an asset cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of assets currently held
    pub entries: usize,

    /// Total bytes currently held
    pub total_bytes: u64,

    pub hits: u64,

    pub misses: u64,

    /// Assets dropped to make room
    pub evictions: u64,
}

impl CacheStats {
    /// Cache usage as a percentage of `max_bytes`.
    pub fn usage_percentage(&self, max_bytes: u64) -> f64 {
        if max_bytes == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / max_bytes as f64) * 100.0
    }

    /// Fraction of lookups that hit, `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }

        self.hits as f64 / lookups as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_percentage() {
        let stats = CacheStats {
            total_bytes: 50,
            ..Default::default()
        };
        assert_eq!(stats.usage_percentage(200), 25.0);
        assert_eq!(stats.usage_percentage(0), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);

        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }
}
