//! Cache Entry Module
//!
//! Defines a single cached payload together with its absolute expiry time.

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry that lives `ttl_minutes` from `now_ms`.
    ///
    /// A zero, negative or NaN TTL produces an entry that is already expired.
    pub fn new(value: T, now_ms: i64, ttl_minutes: f64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_to_ms(ttl_minutes)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is live only while `now_ms < expires_at`,
    /// so it is expired from the exact expiry millisecond onwards.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at - now_ms).max(0)
    }
}

/// Converts a TTL in minutes to milliseconds. Non-positive and NaN inputs
/// give zero; any positive TTL lasts at least one millisecond.
pub(crate) fn ttl_to_ms(ttl_minutes: f64) -> i64 {
    if ttl_minutes.is_nan() || ttl_minutes <= 0.0 {
        return 0;
    }
    // `as` saturates on overflow, which is what an enormous TTL should do.
    ((ttl_minutes * 60_000.0).ceil() as i64).max(1)
}
