//! Response DTOs for the dashboard API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::compare::{CarListing, ComparisonRow};
use crate::session::{Notification, ToggleOutcome};

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
    /// Milliseconds until the entry expires
    pub ttl_remaining_ms: Option<i64>,
}

/// Response body for PUT /cache
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached", key),
            key,
        }
    }
}

/// Response body for DELETE /cache/:key
///
/// Deleting is idempotent, so a missing key is reported rather than
/// treated as an error.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    pub deleted: bool,
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub cleared: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Response body for POST /compare/best
#[derive(Debug, Clone, Serialize)]
pub struct BestValueResponse {
    pub attribute: String,
    pub best_index: Option<usize>,
}

/// Response body for the comparison table endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonTableResponse {
    pub rows: Vec<ComparisonRow>,
}

/// Response body for GET /comparison and POST /comparison/toggle
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ToggleOutcome>,
    pub listings: Vec<CarListing>,
    pub remaining: usize,
}

/// Response body for GET /favorites and POST /favorites/toggle
#[derive(Debug, Clone, Serialize)]
pub struct FavoritesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    pub listings: Vec<CarListing>,
}

/// Response body for GET /notifications
#[derive(Debug, Clone, Serialize)]
pub struct NotificationsResponse {
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

/// Response body for POST /notifications
#[derive(Debug, Clone, Serialize)]
pub struct NotifyResponse {
    pub notification: Notification,
    /// Whether the UI should also raise a browser notification
    pub push_to_browser: bool,
}
