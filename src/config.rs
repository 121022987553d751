//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::backend::DEFAULT_TIMEOUT;
use crate::cache::DEFAULT_TTL_MINUTES;
use crate::session::DEFAULT_MAX_COMPARE;

/// Default base URL of the listings backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in minutes for cache entries set without an explicit TTL
    pub default_ttl_minutes: f64,
    /// Maximum number of listings in the comparison set
    pub max_compare: usize,
    /// JSON file for session state; in-memory when unset
    pub store_path: Option<PathBuf>,
    /// Base URL of the listings backend
    pub backend_url: String,
    /// Per-request timeout for backend calls, in seconds
    pub backend_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TTL_MINUTES` - Default cache TTL in minutes (default: 5)
    /// - `MAX_COMPARE` - Comparison set capacity (default: 3)
    /// - `STORE_PATH` - Session state file (default: none, in-memory)
    /// - `BACKEND_URL` - Listings backend base URL (default: http://localhost:5000/api)
    /// - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            default_ttl_minutes: parse_var("DEFAULT_TTL_MINUTES")
                .filter(|ttl: &f64| ttl.is_finite() && *ttl > 0.0)
                .unwrap_or(defaults.default_ttl_minutes),
            max_compare: parse_var("MAX_COMPARE")
                .filter(|max: &usize| *max > 0)
                .unwrap_or(defaults.max_compare),
            store_path: env::var("STORE_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            backend_url: env::var("BACKEND_URL")
                .ok()
                .filter(|u| !u.is_empty())
                .unwrap_or(defaults.backend_url),
            backend_timeout_secs: parse_var("BACKEND_TIMEOUT_SECS")
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.backend_timeout_secs),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_ttl_minutes: DEFAULT_TTL_MINUTES,
            max_compare: DEFAULT_MAX_COMPARE,
            store_path: None,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}
