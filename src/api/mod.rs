//! API Module
//!
//! HTTP handlers and routing for the dashboard service REST API.

pub mod handlers;
pub mod proxy;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
