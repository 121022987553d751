//! Cache Statistics Module
//!
//! Counters for lookup outcomes and lazily dropped entries.

use serde::Serialize;

/// Snapshot of how an [`ExpiringCache`](super::ExpiringCache) has been used.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing, expired entries included
    pub misses: u64,
    /// Stale entries dropped on lookup
    pub expirations: u64,
    /// Entries held at snapshot time, stale ones not yet looked up included
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of lookups that were served from the cache; 0.0 before the
    /// first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// An expired entry counts as a miss as well.
    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
        self.misses += 1;
    }

    pub(crate) fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_stats_are_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_every_lookup() {
        let mut stats = CacheStats::new();
        for _ in 0..3 {
            stats.record_hit();
        }
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_expiration_is_also_a_miss() {
        let mut stats = CacheStats::new();
        stats.record_expiration();
        stats.record_expiration();
        stats.record_hit();

        assert_eq!(stats.expirations, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.lookups(), 3);
    }
}
