//! Request DTOs for the dashboard API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;
use crate::session::NotificationKind;

/// Request body for storing a cached response (PUT /cache)
///
/// # Fields
/// - `key`: Caller-composed cache key, e.g. endpoint plus parameters
/// - `value`: Arbitrary JSON payload
/// - `ttl_minutes`: Optional TTL in minutes (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl_minutes: Option<f64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

/// Query string for GET|DELETE /cache/entry, for keys that contain `/`
/// or `?` and so cannot travel as a single path segment unencoded.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyQuery {
    pub key: String,
}

/// Request body for POST /compare/best
#[derive(Debug, Clone, Deserialize)]
pub struct BestValueRequest {
    pub attribute: String,
    #[serde(default)]
    pub entities: Vec<Value>,
}

/// Request body for POST /compare/table
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonTableRequest {
    #[serde(default)]
    pub entities: Vec<Value>,
}

/// Request body for POST /notifications
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyRequest {
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
}

impl NotifyRequest {
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        None
    }
}
