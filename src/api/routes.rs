//! API Routes
//!
//! Configures the Axum router with all dashboard endpoints.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::*;
use super::proxy::*;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache`, `GET|DELETE /cache/:key`, `GET|DELETE /cache/entry?key=`,
///   `DELETE /cache` - Response cache
/// - `GET /stats` - Cache statistics
/// - `POST /compare/best`, `POST /compare/table` - Best-value comparator
/// - `/comparison/*` - Persisted comparison set
/// - `/favorites/*` - Favorite listings
/// - `/notifications/*` - Notification center
/// - `POST /export/csv` - CSV export of listing rows
/// - `/backend/*` - Memoized reads from the listings backend
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, since the dashboard UI is served separately
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", put(set_handler).delete(clear_handler))
        .route(
            "/cache/entry",
            get(get_by_query_handler).delete(delete_by_query_handler),
        )
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/stats", get(stats_handler))
        .route("/compare/best", post(best_value_handler))
        .route("/compare/table", post(comparison_table_handler))
        .route(
            "/comparison",
            get(get_comparison_handler).delete(clear_comparison_handler),
        )
        .route("/comparison/toggle", post(toggle_comparison_handler))
        .route("/comparison/rows", get(comparison_rows_handler))
        .route("/comparison/export", get(export_comparison_handler))
        .route("/comparison/:id", delete(remove_comparison_handler))
        .route("/favorites", get(get_favorites_handler))
        .route("/favorites/toggle", post(toggle_favorite_handler))
        .route("/favorites/:id", delete(remove_favorite_handler))
        .route(
            "/notifications",
            get(list_notifications_handler).post(add_notification_handler),
        )
        .route("/notifications/read-all", post(mark_all_read_handler))
        .route("/notifications/preferences", patch(update_preferences_handler))
        .route("/notifications/:id", delete(delete_notification_handler))
        .route("/notifications/:id/read", post(mark_read_handler))
        .route("/export/csv", post(export_csv_handler))
        .route("/backend/popular/brands", get(popular_brands_handler))
        .route("/backend/popular/models", get(popular_models_handler))
        .route("/backend/price-history", get(price_history_handler))
        .route("/backend/listing-details", get(listing_details_handler))
        .route("/backend/charts/price-trend", get(price_trend_handler))
        .route("/backend/charts/price-distribution", get(price_distribution_handler))
        .route("/backend/search", post(search_handler))
        .route("/backend/estimate", post(estimate_handler))
        .route("/backend/login", post(login_handler))
        .route("/backend/logout", post(logout_handler))
        .route("/backend/register", post(register_handler))
        .route("/backend/user/profile", get(profile_handler))
        .route("/backend/user/preferences", put(user_preferences_handler))
        .route(
            "/backend/user/favorites",
            get(user_favorites_handler).post(add_user_favorite_handler),
        )
        .route("/backend/user/favorites/sync", post(sync_favorites_handler))
        .route("/backend/user/favorites/:id", delete(remove_user_favorite_handler))
        .route(
            "/backend/user/search-history",
            get(search_history_handler).post(add_search_history_handler),
        )
        .route("/backend/cache", delete(invalidate_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
