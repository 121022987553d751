//! Property-Based Tests for Cache Module
//!
//! Uses proptest with a simulated clock to check expiry, freshness and
//! overwrite behaviour over arbitrary keys, values and TTLs.

use std::collections::HashMap;

use proptest::prelude::*;

use crate::cache::entry::ttl_to_ms;
use crate::cache::{Clock, ExpiringCache, ManualClock};

// == Test Configuration ==
const START_MS: i64 = 1_700_000_000_000;
const TEST_DEFAULT_TTL: f64 = 5.0;

// == Strategies ==
/// Generates cache keys shaped like composed request keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z/]{1,24}(\\?[a-z]{1,8}=[a-zA-Z0-9]{1,8}){0,3}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,128}"
}

/// Positive TTLs from well below a millisecond up to a day
fn ttl_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        (1u32..=1440 * 60).prop_map(|seconds| f64::from(seconds) / 60.0),
        1e-12f64..1e-4,
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String, ttl: f64 },
    Get { key: String },
    Delete { key: String },
    Advance { ms: i64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    let keys = prop::sample::select(vec!["a", "b", "c", "d"]);
    prop_oneof![
        (keys.clone(), value_strategy(), -2.0f64..10.0).prop_map(|(key, value, ttl)| {
            CacheOp::Set { key: key.to_string(), value, ttl }
        }),
        keys.clone().prop_map(|key| CacheOp::Get { key: key.to_string() }),
        keys.prop_map(|key| CacheOp::Delete { key: key.to_string() }),
        (0i64..600_000).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

fn new_cache() -> (ExpiringCache<String, ManualClock>, ManualClock) {
    let clock = ManualClock::new(START_MS);
    (ExpiringCache::with_clock(TEST_DEFAULT_TTL, clock.clone()), clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Once the TTL has fully elapsed a lookup misses, and the entry does not
    // come back on later lookups.
    #[test]
    fn prop_expired_entries_stay_gone(
        key in key_strategy(),
        value in value_strategy(),
        ttl in ttl_strategy(),
        extra_ms in 1i64..3_600_000,
    ) {
        let (mut cache, clock) = new_cache();
        cache.set(key.clone(), value, Some(ttl));

        clock.advance_ms(ttl_to_ms(ttl) + extra_ms - 1);

        prop_assert!(cache.get(&key).is_none());
        prop_assert!(cache.get(&key).is_none());
        prop_assert_eq!(cache.len(), 0);
    }

    // A lookup straight after a set with a positive TTL returns the value.
    #[test]
    fn prop_fresh_entries_round_trip(
        key in key_strategy(),
        value in value_strategy(),
        ttl in ttl_strategy(),
    ) {
        let (mut cache, _) = new_cache();
        cache.set(key.clone(), value.clone(), Some(ttl));

        prop_assert_eq!(cache.get(&key), Some(&value));
    }

    // The second of two sets on one key always wins.
    #[test]
    fn prop_last_write_wins(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy(),
        ttl1 in ttl_strategy(),
        ttl2 in ttl_strategy(),
    ) {
        let (mut cache, _) = new_cache();
        cache.set(key.clone(), first, Some(ttl1));
        cache.set(key.clone(), second.clone(), Some(ttl2));

        prop_assert_eq!(cache.get(&key), Some(&second));
        prop_assert_eq!(cache.len(), 1);
    }

    // Replays random operations against a simple model that records the
    // expiry of each key, and checks every lookup and the hit/miss counters.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (mut cache, clock) = new_cache();
        let mut model: HashMap<String, (String, i64)> = HashMap::new();
        let mut hits = 0u64;
        let mut misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Set { key, value, ttl } => {
                    model.insert(key.clone(), (value.clone(), clock.now_ms() + ttl_to_ms(ttl)));
                    cache.set(key, value, Some(ttl));
                }
                CacheOp::Get { key } => {
                    let now = clock.now_ms();
                    let expected = match model.get(&key) {
                        Some((value, expires_at)) if now < *expires_at => Some(value.clone()),
                        _ => None,
                    };
                    if expected.is_none() {
                        model.remove(&key);
                        misses += 1;
                    } else {
                        hits += 1;
                    }
                    prop_assert_eq!(cache.get(&key).cloned(), expected);
                }
                CacheOp::Delete { key } => {
                    model.remove(&key);
                    cache.delete(&key);
                }
                CacheOp::Advance { ms } => clock.advance_ms(ms),
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
        prop_assert_eq!(stats.total_entries, model.len());
    }
}
