//! Carboard - service layer for a used-car listings dashboard
//!
//! Provides an expiring response cache, best-value comparison of listings,
//! and persisted favorites, comparison set and notifications.

pub mod api;
pub mod backend;
pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod storage;

pub use api::AppState;
pub use backend::BackendClient;
pub use cache::ExpiringCache;
pub use compare::best_index;
pub use config::Config;
pub use error::{CarboardError, Result};
