//! API Handlers
//!
//! HTTP request handlers for the response cache, the comparator and the
//! persisted session state.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::backend::BackendClient;
use crate::cache::ExpiringCache;
use crate::compare::{best_index, comparison_rows, CarListing};
use crate::config::Config;
use crate::error::{CarboardError, Result};
use crate::export::{comparison_export, export_file_name, listings_to_csv};
use crate::models::{
    BestValueRequest, BestValueResponse, ClearResponse, ComparisonResponse, ComparisonTableRequest,
    ComparisonTableResponse, DeleteResponse, FavoritesResponse, GetResponse, HealthResponse,
    KeyQuery, NotificationsResponse, NotifyRequest, NotifyResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::session::{NotificationPreferences, PreferencesUpdate, Session, ToggleOutcome};
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};

/// Application state shared across all handlers.
///
/// The cache and the session are explicitly constructed at startup and
/// shared behind `Arc<RwLock<>>`. The backend client shares its own state.
#[derive(Clone)]
pub struct AppState {
    /// Response cache for the UI
    pub cache: Arc<RwLock<ExpiringCache<Value>>>,
    /// Favorites, comparison set and notifications
    pub session: Arc<RwLock<Session>>,
    /// Memoizing client for the listings backend
    pub backend: BackendClient,
}

impl AppState {
    /// Creates a new AppState from already built parts.
    pub fn new(cache: ExpiringCache<Value>, session: Session, backend: BackendClient) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            session: Arc::new(RwLock::new(session)),
            backend,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Session state goes to `store_path` when set, otherwise it is kept in
    /// memory for the lifetime of the process.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Box<dyn KeyValueStore> = match &config.store_path {
            Some(path) => Box::new(JsonFileStore::open(path)?),
            None => Box::new(MemoryStore::new()),
        };
        let cache = ExpiringCache::new(config.default_ttl_minutes);
        let session = Session::open(store, config.max_compare);
        let backend = BackendClient::new(
            config.backend_url.clone(),
            ExpiringCache::new(config.default_ttl_minutes),
        )
        .with_timeout(Duration::from_secs(config.backend_timeout_secs));
        Ok(Self::new(cache, session, backend))
    }
}

// == Cache ==

/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CarboardError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, req.ttl_minutes);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
///
/// The key is one path segment, so `/` and `?` inside it must be
/// percent-encoded. GET /cache/entry?key= takes it from the query instead.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    lookup_entry(&state, key).await
}

/// Handler for GET /cache/entry?key=
pub async fn get_by_query_handler(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<GetResponse>> {
    lookup_entry(&state, query.key).await
}

async fn lookup_entry(state: &AppState, key: String) -> Result<Json<GetResponse>> {
    // Write lock: a lookup may remove an expired entry.
    let mut cache = state.cache.write().await;
    let value = cache
        .get(&key)
        .cloned()
        .ok_or_else(|| CarboardError::NotFound(format!("Key not found: {}", key)))?;
    let ttl_remaining_ms = cache.ttl_remaining_ms(&key);

    Ok(Json(GetResponse {
        key,
        value,
        ttl_remaining_ms,
    }))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    delete_entry(&state, key).await
}

/// Handler for DELETE /cache/entry?key=
pub async fn delete_by_query_handler(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Json<DeleteResponse> {
    delete_entry(&state, query.key).await
}

async fn delete_entry(state: &AppState, key: String) -> Json<DeleteResponse> {
    let deleted = state.cache.write().await.delete(&key);
    Json(DeleteResponse { key, deleted })
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let cleared = cache.len();
    cache.clear();
    info!(cleared, "response cache cleared");

    Json(ClearResponse {
        message: "Cache cleared".to_string(),
        cleared,
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Comparator ==

/// Handler for POST /compare/best
pub async fn best_value_handler(Json(req): Json<BestValueRequest>) -> Json<BestValueResponse> {
    let best_index = best_index(&req.entities, &req.attribute);
    Json(BestValueResponse {
        attribute: req.attribute,
        best_index,
    })
}

/// Handler for POST /compare/table
pub async fn comparison_table_handler(
    Json(req): Json<ComparisonTableRequest>,
) -> Json<ComparisonTableResponse> {
    Json(ComparisonTableResponse {
        rows: comparison_rows(&req.entities),
    })
}

// == Comparison Set ==

fn comparison_response(session: &Session, outcome: Option<ToggleOutcome>) -> ComparisonResponse {
    let comparison = session.comparison();
    ComparisonResponse {
        outcome,
        listings: comparison.listings().to_vec(),
        remaining: comparison.remaining(),
    }
}

/// Handler for GET /comparison
pub async fn get_comparison_handler(State(state): State<AppState>) -> Json<ComparisonResponse> {
    let session = state.session.read().await;
    Json(comparison_response(&session, None))
}

/// Handler for POST /comparison/toggle
pub async fn toggle_comparison_handler(
    State(state): State<AppState>,
    Json(listing): Json<CarListing>,
) -> Result<Json<ComparisonResponse>> {
    let mut session = state.session.write().await;
    let outcome = session.toggle_comparison(listing)?;
    Ok(Json(comparison_response(&session, Some(outcome))))
}

/// Handler for DELETE /comparison/:id
pub async fn remove_comparison_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ComparisonResponse>> {
    let mut session = state.session.write().await;
    if !session.remove_from_comparison(&id)? {
        return Err(CarboardError::NotFound(format!("Listing {} is not being compared", id)));
    }
    Ok(Json(comparison_response(&session, None)))
}

/// Handler for DELETE /comparison
pub async fn clear_comparison_handler(
    State(state): State<AppState>,
) -> Result<Json<ComparisonResponse>> {
    let mut session = state.session.write().await;
    session.clear_comparison()?;
    Ok(Json(comparison_response(&session, None)))
}

/// Handler for GET /comparison/rows
pub async fn comparison_rows_handler(State(state): State<AppState>) -> Json<ComparisonTableResponse> {
    let session = state.session.read().await;
    Json(ComparisonTableResponse {
        rows: session.comparison().best_rows(),
    })
}

/// Handler for GET /comparison/export
///
/// Returns the comparison as a JSON attachment named
/// `car_comparison_YYYY-MM-DD.json`.
pub async fn export_comparison_handler(State(state): State<AppState>) -> Result<Response> {
    let session = state.session.read().await;
    let listings = session.comparison().listings();
    if listings.is_empty() {
        return Err(CarboardError::NotFound("Comparison set is empty".to_string()));
    }

    let now = Utc::now();
    let file_name = export_file_name("car_comparison", now.date_naive(), "json");
    let disposition = format!("attachment; filename=\"{}\"", file_name);

    Ok((
        [(header::CONTENT_DISPOSITION, disposition)],
        Json(comparison_export(listings, now)),
    )
        .into_response())
}

/// Handler for POST /export/csv
///
/// Renders the posted listing rows as a CSV attachment.
pub async fn export_csv_handler(Json(rows): Json<Vec<Value>>) -> Result<Response> {
    let csv = listings_to_csv(&rows)
        .ok_or_else(|| CarboardError::InvalidRequest("No listing rows to export".to_string()))?;

    let file_name = export_file_name("car_listings", Utc::now().date_naive(), "csv");
    let disposition = format!("attachment; filename=\"{}\"", file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

// == Favorites ==

/// Handler for GET /favorites
pub async fn get_favorites_handler(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let session = state.session.read().await;
    Json(FavoritesResponse {
        favorite: None,
        listings: session.favorites().list().to_vec(),
    })
}

/// Handler for POST /favorites/toggle
pub async fn toggle_favorite_handler(
    State(state): State<AppState>,
    Json(listing): Json<CarListing>,
) -> Result<Json<FavoritesResponse>> {
    let mut session = state.session.write().await;
    let favorite = session.toggle_favorite(listing)?;
    Ok(Json(FavoritesResponse {
        favorite: Some(favorite),
        listings: session.favorites().list().to_vec(),
    }))
}

/// Handler for DELETE /favorites/:id
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FavoritesResponse>> {
    let mut session = state.session.write().await;
    if !session.remove_favorite(&id)? {
        return Err(CarboardError::NotFound(format!("Listing {} is not a favorite", id)));
    }
    Ok(Json(FavoritesResponse {
        favorite: Some(false),
        listings: session.favorites().list().to_vec(),
    }))
}

// == Notifications ==

/// Handler for GET /notifications
pub async fn list_notifications_handler(State(state): State<AppState>) -> Json<NotificationsResponse> {
    let session = state.session.read().await;
    let center = session.notifications();
    Json(NotificationsResponse {
        unread: center.unread_count(),
        notifications: center.list().to_vec(),
    })
}

/// Handler for POST /notifications
pub async fn add_notification_handler(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CarboardError::InvalidRequest(error_msg));
    }

    let mut session = state.session.write().await;
    let notification = session.notify(req.title, req.message, req.kind)?;
    Ok(Json(NotifyResponse {
        notification,
        push_to_browser: session.notifications().push_to_browser(),
    }))
}

/// Handler for POST /notifications/:id/read
pub async fn mark_read_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationsResponse>> {
    let mut session = state.session.write().await;
    if !session.mark_notification_read(id)? {
        return Err(CarboardError::NotFound(format!("Notification {} not found", id)));
    }
    let center = session.notifications();
    Ok(Json(NotificationsResponse {
        unread: center.unread_count(),
        notifications: center.list().to_vec(),
    }))
}

/// Handler for POST /notifications/read-all
pub async fn mark_all_read_handler(
    State(state): State<AppState>,
) -> Result<Json<NotificationsResponse>> {
    let mut session = state.session.write().await;
    session.mark_all_notifications_read()?;
    let center = session.notifications();
    Ok(Json(NotificationsResponse {
        unread: center.unread_count(),
        notifications: center.list().to_vec(),
    }))
}

/// Handler for DELETE /notifications/:id
pub async fn delete_notification_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationsResponse>> {
    let mut session = state.session.write().await;
    if !session.delete_notification(id)? {
        return Err(CarboardError::NotFound(format!("Notification {} not found", id)));
    }
    let center = session.notifications();
    Ok(Json(NotificationsResponse {
        unread: center.unread_count(),
        notifications: center.list().to_vec(),
    }))
}

/// Handler for PATCH /notifications/preferences
pub async fn update_preferences_handler(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> Result<Json<NotificationPreferences>> {
    let mut session = state.session.write().await;
    Ok(Json(session.update_preferences(update)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{FieldValue, ListingId};
    use crate::config::DEFAULT_BACKEND_URL;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(
            ExpiringCache::new(5.0),
            Session::open(Box::new(MemoryStore::new()), 3),
            BackendClient::new(DEFAULT_BACKEND_URL, ExpiringCache::new(5.0)),
        )
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "popular/brands?limit=10".to_string(),
            value: json!([{"brand": "Audi", "count": 120}]),
            ttl_minutes: None,
        };
        assert!(set_handler(State(state.clone()), Json(req)).await.is_ok());

        let response = get_handler(State(state), Path("popular/brands?limit=10".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value[0]["brand"], "Audi");
        assert!(response.ttl_remaining_ms.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(test_state()), Path("nope".to_string())).await;
        assert!(matches!(result, Err(CarboardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_never_served() {
        let state = test_state();
        let req = SetRequest {
            key: "k".to_string(),
            value: json!(1),
            ttl_minutes: Some(0.0),
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        assert!(get_handler(State(state), Path("k".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let state = test_state();
        state.cache.write().await.set("k", json!(1), None);

        let first = delete_handler(State(state.clone()), Path("k".to_string())).await;
        let second = delete_handler(State(state), Path("k".to_string())).await;
        assert!(first.deleted);
        assert!(!second.deleted);
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!(null),
            ttl_minutes: None,
        };
        let result = set_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(CarboardError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_best_value_handler() {
        let req = BestValueRequest {
            attribute: "price".to_string(),
            entities: vec![json!({"price": "Nav norādīts"}), json!({"price": 15000}), json!({"price": 12000})],
        };
        let response = best_value_handler(Json(req)).await;
        assert_eq!(response.best_index, Some(2));
    }

    #[tokio::test]
    async fn test_comparison_full_is_conflict() {
        let state = test_state();
        for id in 1..=3 {
            let listing = CarListing {
                id: Some(ListingId::Int(id)),
                price: FieldValue::from(1000.0),
                ..Default::default()
            };
            toggle_comparison_handler(State(state.clone()), Json(listing)).await.unwrap();
        }

        let extra = CarListing {
            id: Some(ListingId::Int(4)),
            ..Default::default()
        };
        let result = toggle_comparison_handler(State(state), Json(extra)).await;
        assert!(matches!(result, Err(CarboardError::ComparisonFull(3))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(test_state())).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
