//! Cache Module
//!
//! Provides a short-TTL in-memory cache with lazy expiry, used to memoize
//! repeated backend queries.

mod clock;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::ExpiringCache;

// == Public Constants ==
/// TTL applied when a caller does not pass one
pub const DEFAULT_TTL_MINUTES: f64 = 5.0;

/// Maximum allowed key length in bytes for keys arriving over HTTP
pub const MAX_KEY_LENGTH: usize = 256;
