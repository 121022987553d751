//! Models Module
//!
//! Request and response DTOs for the dashboard HTTP API.

mod requests;
mod responses;

pub use requests::*;
pub use responses::*;
