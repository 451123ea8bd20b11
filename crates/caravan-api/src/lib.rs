//! # Caravan API
//!
//! HTTP handlers, extractors, DTOs, and the router.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
