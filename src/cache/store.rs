//! Expiring Cache Module
//!
//! Short-lived memoization map with lazy, read-triggered expiry.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, DEFAULT_TTL_MINUTES};

// == Expiring Cache ==
/// In-memory cache whose entries expire a fixed number of minutes after they
/// are set.
///
/// There is no background sweep. A stale entry is only removed when its key
/// is looked up again, or when the cache is cleared.
#[derive(Debug)]
pub struct ExpiringCache<T, C = SystemClock> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Lookup statistics
    stats: CacheStats,
    /// TTL used when `set` is called without one
    default_ttl_minutes: f64,
    /// Time source for expiry checks
    clock: C,
}

impl<T> ExpiringCache<T, SystemClock> {
    // == Constructor ==
    /// Creates an empty cache on the system clock.
    pub fn new(default_ttl_minutes: f64) -> Self {
        Self::with_clock(default_ttl_minutes, SystemClock)
    }
}

impl<T> Default for ExpiringCache<T, SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MINUTES)
    }
}

impl<T, C: Clock> ExpiringCache<T, C> {
    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(default_ttl_minutes: f64, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl_minutes,
            clock,
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_minutes` (the default TTL if
    /// `None`).
    ///
    /// Replaces any existing entry for the key, value and expiry alike. A
    /// non-positive TTL stores an entry that no `get` will ever return.
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl_minutes: Option<f64>) {
        let ttl = ttl_minutes.unwrap_or(self.default_ttl_minutes);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);
        self.entries.insert(key.into(), entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if it is present and not yet expired.
    ///
    /// An expired entry is removed as part of the lookup, so it cannot be
    /// returned by any later `get` either.
    pub fn get(&mut self, key: &str) -> Option<&T> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            debug!(key, "dropped expired cache entry");
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry (live or stale) was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Removes every entry unconditionally.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);
        debug!(dropped, "cache cleared");
    }

    /// Remaining lifetime of a live entry in milliseconds. Does not count as
    /// a lookup and does not remove stale entries.
    pub fn ttl_remaining_ms(&self, key: &str) -> Option<i64> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining_ms(now))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, including stale ones not yet looked up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_ttl_minutes(&self) -> f64 {
        self.default_ttl_minutes
    }
}
