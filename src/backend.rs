//! Backend Client
//!
//! HTTP client for the listings backend. Read endpoints are memoized in an
//! [`ExpiringCache`] keyed by endpoint and parameters, so repeating a search
//! or chart request within the TTL costs no network round-trip.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::cache::{Clock, ExpiringCache, SystemClock};
use crate::compare::CarListing;
use crate::error::{CarboardError, Result};

/// Builds the cache key for a request: `endpoint?k1=v1&k2=v2` with the
/// parameters sorted by name, or just `endpoint` when there are none.
pub fn cache_key(endpoint: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return endpoint.to_string();
    }
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

    let query: Vec<String> = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{endpoint}?{}", query.join("&"))
}

/// Copy of `value` with object keys sorted at every level, so equal
/// parameter sets produce equal cache keys whatever their field order.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k.clone(), canonical(v))).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Applied to every backend request unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// == Backend Client ==
/// Cloning is cheap: clones share the connection pool, the token and the
/// response cache. Locks are held only around cache and token access,
/// never across a network round-trip.
pub struct BackendClient<C = SystemClock> {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
    token: Arc<RwLock<Option<String>>>,
    cache: Arc<Mutex<ExpiringCache<Value, C>>>,
}

impl<C> Clone for BackendClient<C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            timeout: self.timeout,
            token: Arc::clone(&self.token),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C: Clock> BackendClient<C> {
    pub fn new(base_url: impl Into<String>, cache: ExpiringCache<Value, C>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
            token: Arc::new(RwLock::new(None)),
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Arc::new(RwLock::new(Some(token.into())));
        self
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Number of memoized responses, expired ones not yet looked up included.
    pub async fn cached_responses(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Drops every memoized response and returns how many there were.
    pub async fn invalidate(&self) -> usize {
        let mut cache = self.cache.lock().await;
        let dropped = cache.len();
        cache.clear();
        dropped
    }

    // == Auth ==
    /// Logs in and keeps the returned bearer token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Value> {
        let body = self.post_json("auth/login", credentials).await?;
        self.keep_token(&body, &credentials.username).await;
        Ok(body)
    }

    /// Creates an account. The backend logs the new user straight in.
    pub async fn register(&self, user: &Value) -> Result<Value> {
        let body = self.post_json("auth/register", user).await?;
        let username = user.get("username").and_then(Value::as_str).unwrap_or_default();
        self.keep_token(&body, username).await;
        Ok(body)
    }

    /// Forgets the token and every cached response.
    pub async fn logout(&self) {
        *self.token.write().await = None;
        self.invalidate().await;
        info!("logged out of backend");
    }

    // == User Endpoints ==
    // Per-user data is never memoized.

    pub async fn profile(&self) -> Result<Value> {
        let request = self.user_request(Method::GET, "user/profile").await?;
        read_json(request.send().await?).await
    }

    pub async fn update_user_preferences(&self, preferences: &Value) -> Result<Value> {
        let request = self.user_request(Method::PUT, "user/preferences").await?;
        read_json(request.json(preferences).send().await?).await
    }

    /// Favorites stored on the server for the logged-in user.
    pub async fn user_favorites(&self) -> Result<Vec<CarListing>> {
        let request = self.user_request(Method::GET, "user/favorites").await?;
        let body = read_json(request.send().await?).await?;
        let favorites = body.get("favorites").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(favorites)?)
    }

    pub async fn add_user_favorite(&self, listing: &CarListing) -> Result<Value> {
        let request = self.user_request(Method::POST, "user/favorites").await?;
        read_json(request.json(&json!({ "car": listing })).send().await?).await
    }

    pub async fn remove_user_favorite(&self, id: &str) -> Result<Value> {
        let endpoint = format!("user/favorites/{id}");
        let request = self.user_request(Method::DELETE, &endpoint).await?;
        read_json(request.send().await?).await
    }

    pub async fn search_history(&self, limit: u32) -> Result<Value> {
        let request = self.user_request(Method::GET, "user/search-history").await?;
        let body = read_json(request.query(&[("limit", limit)]).send().await?).await?;
        Ok(body.get("history").cloned().unwrap_or(Value::Array(Vec::new())))
    }

    pub async fn add_search_history(&self, params: &Value) -> Result<Value> {
        let request = self.user_request(Method::POST, "user/search-history").await?;
        read_json(request.json(&json!({ "params": params })).send().await?).await
    }

    // == Memoized Reads ==
    pub async fn search(&self, params: &Value) -> Result<Value> {
        let key = format!("search#{}", canonical(params));
        if let Some(hit) = self.cached(&key).await {
            return Ok(hit);
        }

        let request = self.prepare(self.http.post(self.url("search")).json(params)).await;
        let value = read_json(request.send().await?).await?;
        self.cache.lock().await.set(key, value.clone(), None);
        Ok(value)
    }

    pub async fn popular_brands(&self, limit: u32) -> Result<Value> {
        self.cached_get("popular/brands", vec![("limit", limit.to_string())]).await
    }

    pub async fn popular_models(&self, brand: Option<&str>, limit: u32) -> Result<Value> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(brand) = brand.filter(|b| !b.is_empty()) {
            params.push(("brand", brand.to_string()));
        }
        self.cached_get("popular/models", params).await
    }

    pub async fn price_history(&self, brand: &str, model: &str, months: u32) -> Result<Value> {
        let params = vec![
            ("brand", brand.to_string()),
            ("model", model.to_string()),
            ("months", months.to_string()),
        ];
        self.cached_get("price-history", params).await
    }

    /// Base64 PNG chart of the price distribution; every filter is optional.
    pub async fn price_distribution_chart(
        &self,
        brand: Option<&str>,
        model: Option<&str>,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> Result<Value> {
        let mut params = Vec::new();
        if let Some(brand) = brand.filter(|b| !b.is_empty()) {
            params.push(("brand", brand.to_string()));
        }
        if let Some(model) = model.filter(|m| !m.is_empty()) {
            params.push(("model", model.to_string()));
        }
        if let Some(year) = year_from {
            params.push(("yearFrom", year.to_string()));
        }
        if let Some(year) = year_to {
            params.push(("yearTo", year.to_string()));
        }
        self.cached_get("charts/price-distribution", params).await
    }

    pub async fn price_trend_chart(&self, brand: &str, model: &str, months: u32) -> Result<Value> {
        let params = vec![
            ("brand", brand.to_string()),
            ("model", model.to_string()),
            ("months", months.to_string()),
        ];
        self.cached_get("charts/price-trend", params).await
    }

    pub async fn listing_details(&self, listing_url: &str) -> Result<Value> {
        self.cached_get("listing-details", vec![("url", listing_url.to_string())]).await
    }

    // == Uncached ==
    /// Value estimate for a car description. Never memoized.
    pub async fn estimate(&self, params: &Value) -> Result<Value> {
        let request = self.prepare(self.http.post(self.url("estimate")).json(params)).await;
        read_json(request.send().await?).await
    }

    pub async fn status(&self) -> Result<Value> {
        let request = self.prepare(self.http.get(self.url("status"))).await;
        read_json(request.send().await?).await
    }

    async fn cached_get(&self, endpoint: &str, params: Vec<(&str, String)>) -> Result<Value> {
        let key = cache_key(endpoint, &params);
        if let Some(hit) = self.cached(&key).await {
            return Ok(hit);
        }

        debug!(%key, "cache miss, fetching");
        let request = self.prepare(self.http.get(self.url(endpoint)).query(&params)).await;
        let value = read_json(request.send().await?).await?;
        self.cache.lock().await.set(key, value.clone(), None);
        Ok(value)
    }

    async fn cached(&self, key: &str) -> Option<Value> {
        let hit = self.cache.lock().await.get(key).cloned();
        if hit.is_some() {
            debug!(%key, "cache hit");
        }
        hit
    }

    async fn post_json<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let request = self
            .http
            .post(self.url(endpoint))
            .json(body)
            .timeout(self.timeout);
        read_json(request.send().await?).await
    }

    async fn keep_token(&self, body: &Value, username: &str) {
        if let Some(token) = body.get("token").and_then(Value::as_str) {
            *self.token.write().await = Some(token.to_string());
            info!(user = %username, "logged in to backend");
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Adds the timeout and, when logged in, the bearer token.
    async fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Request to a per-user endpoint; fails without a token.
    async fn user_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or_else(|| CarboardError::Unauthorized("No authentication token".to_string()))?;
        Ok(self
            .http
            .request(method, self.url(endpoint))
            .timeout(self.timeout)
            .bearer_auth(token))
    }
}

/// Decodes a JSON body, turning non-success statuses into
/// [`CarboardError::Backend`] with the backend's `error` message if it sent
/// one.
async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        });

    Err(CarboardError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_sorts_params() {
        let a = cache_key("popular/models", &[("limit", "10".into()), ("brand", "Audi".into())]);
        let b = cache_key("popular/models", &[("brand", "Audi".into()), ("limit", "10".into())]);

        assert_eq!(a, "popular/models?brand=Audi&limit=10");
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_key_without_params() {
        assert_eq!(cache_key("charts/price-distribution", &[]), "charts/price-distribution");
    }

    #[test]
    fn test_canonical_ignores_field_order() {
        let a = json!({"brand": "BMW", "filters": {"yearTo": 2020, "yearFrom": 2010}});
        let b = json!({"filters": {"yearFrom": 2010, "yearTo": 2020}, "brand": "BMW"});

        assert_eq!(canonical(&a).to_string(), canonical(&b).to_string());
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash() {
        let client = BackendClient::new("http://localhost:5000/api/", ExpiringCache::new(5.0));
        assert_eq!(client.url("status"), "http://localhost:5000/api/status");
        assert!(!client.is_authenticated().await);
        assert!(client.with_token("t").is_authenticated().await);
    }

    #[tokio::test]
    async fn test_user_endpoints_need_token() {
        // Never reaches the network: the token check fails first.
        let client = BackendClient::new("http://localhost:1/api", ExpiringCache::new(5.0));

        let result = client.user_favorites().await;
        assert!(matches!(result, Err(CarboardError::Unauthorized(_))));
        assert!(matches!(
            client.add_search_history(&json!({"brand": "Audi"})).await,
            Err(CarboardError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_cache() {
        let client = BackendClient::new("http://localhost:1/api", ExpiringCache::new(5.0));
        let other = client.clone();

        client.cache.lock().await.set("k", json!(1), None);
        assert_eq!(other.cached_responses().await, 1);
        assert_eq!(other.invalidate().await, 1);
        assert_eq!(client.cached_responses().await, 0);
    }
}
