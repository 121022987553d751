//! Error types for the dashboard service
//!
//! Provides unified error handling using thiserror. The cache and the
//! comparator are infallible; everything here comes from persistence, the
//! backend client, or request validation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Carboard Error Enum ==
/// Unified error type for the dashboard service.
#[derive(Error, Debug)]
pub enum CarboardError {
    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// User endpoint called without a bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Comparison set already holds the maximum number of listings
    #[error("At most {0} listings can be compared")]
    ComparisonFull(usize),

    /// Reading or writing the persistent store failed
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored or received JSON could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Could not reach the listings backend
    #[error("Backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Listings backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CarboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            CarboardError::NotFound(_) => StatusCode::NOT_FOUND,
            CarboardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CarboardError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CarboardError::ComparisonFull(_) => StatusCode::CONFLICT,
            CarboardError::Http(_) | CarboardError::Backend { .. } => StatusCode::BAD_GATEWAY,
            CarboardError::Io(_)
            | CarboardError::Serialization(_)
            | CarboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the dashboard service.
pub type Result<T> = std::result::Result<T, CarboardError>;
