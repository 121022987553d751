//! Backend Proxy Handlers
//!
//! Forwards the dashboard's read requests to the listings backend through
//! the memoizing [`BackendClient`](crate::backend::BackendClient).

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::handlers::AppState;
use crate::backend::Credentials;
use crate::compare::CarListing;
use crate::error::Result;
use crate::models::FavoritesResponse;

fn default_limit() -> u32 {
    10
}

fn default_trend_months() -> u32 {
    12
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    pub brand: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub brand: String,
    pub model: String,
    #[serde(default = "default_trend_months")]
    pub months: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionQuery {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

/// Handler for GET /backend/popular/brands
pub async fn popular_brands_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.popular_brands(query.limit).await?))
}

/// Handler for GET /backend/popular/models
pub async fn popular_models_handler(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<Value>> {
    Ok(Json(
        state
            .backend
            .popular_models(query.brand.as_deref(), query.limit)
            .await?,
    ))
}

/// Handler for GET /backend/charts/price-trend
pub async fn price_trend_handler(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Value>> {
    Ok(Json(
        state
            .backend
            .price_trend_chart(&query.brand, &query.model, query.months)
            .await?,
    ))
}

/// Handler for GET /backend/price-history
pub async fn price_history_handler(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Value>> {
    Ok(Json(
        state
            .backend
            .price_history(&query.brand, &query.model, query.months)
            .await?,
    ))
}

/// Handler for GET /backend/listing-details
pub async fn listing_details_handler(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.listing_details(&query.url).await?))
}

/// Handler for GET /backend/charts/price-distribution
pub async fn price_distribution_handler(
    State(state): State<AppState>,
    Query(query): Query<DistributionQuery>,
) -> Result<Json<Value>> {
    Ok(Json(
        state
            .backend
            .price_distribution_chart(
                query.brand.as_deref(),
                query.model.as_deref(),
                query.year_from,
                query.year_to,
            )
            .await?,
    ))
}

/// Handler for POST /backend/search
pub async fn search_handler(
    State(state): State<AppState>,
    Json(params): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.search(&params).await?))
}

/// Handler for POST /backend/estimate
pub async fn estimate_handler(
    State(state): State<AppState>,
    Json(params): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.estimate(&params).await?))
}

/// Handler for POST /backend/login
pub async fn login_handler(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.login(&credentials).await?))
}

/// Handler for POST /backend/logout
pub async fn logout_handler(State(state): State<AppState>) -> Json<Value> {
    state.backend.logout().await;
    Json(json!({ "authenticated": false }))
}

/// Handler for DELETE /backend/cache
///
/// Drops every memoized backend response.
pub async fn invalidate_handler(State(state): State<AppState>) -> Json<Value> {
    let dropped = state.backend.invalidate().await;
    Json(json!({ "cleared": dropped }))
}

/// Handler for POST /backend/register
pub async fn register_handler(
    State(state): State<AppState>,
    Json(user): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.register(&user).await?))
}

// == User Endpoints ==

/// Handler for GET /backend/user/profile
pub async fn profile_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    Ok(Json(state.backend.profile().await?))
}

/// Handler for PUT /backend/user/preferences
pub async fn user_preferences_handler(
    State(state): State<AppState>,
    Json(preferences): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.update_user_preferences(&preferences).await?))
}

/// Handler for GET /backend/user/favorites
pub async fn user_favorites_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let favorites = state.backend.user_favorites().await?;
    Ok(Json(json!({ "favorites": favorites })))
}

/// Handler for POST /backend/user/favorites
pub async fn add_user_favorite_handler(
    State(state): State<AppState>,
    Json(listing): Json<CarListing>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.add_user_favorite(&listing).await?))
}

/// Handler for DELETE /backend/user/favorites/:id
pub async fn remove_user_favorite_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.remove_user_favorite(&id).await?))
}

/// Handler for POST /backend/user/favorites/sync
///
/// Replaces the local favorites with the ones stored for the logged-in
/// user.
pub async fn sync_favorites_handler(
    State(state): State<AppState>,
) -> Result<Json<FavoritesResponse>> {
    let favorites = state.backend.user_favorites().await?;
    let mut session = state.session.write().await;
    session.replace_favorites(favorites)?;
    Ok(Json(FavoritesResponse {
        favorite: None,
        listings: session.favorites().list().to_vec(),
    }))
}

/// Handler for GET /backend/user/search-history
pub async fn search_history_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>> {
    let history = state.backend.search_history(query.limit).await?;
    Ok(Json(json!({ "history": history })))
}

/// Handler for POST /backend/user/search-history
pub async fn add_search_history_handler(
    State(state): State<AppState>,
    Json(params): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.backend.add_search_history(&params).await?))
}
