//! API Layer
//!
//! HTTP API endpoints and request handling for the magic-link service.

pub mod handlers;
pub mod routes;
pub mod templates;

// Re-export commonly used types
pub use handlers::AppState;
pub use routes::{create_routes, RouterBuilder};
pub use templates::page_templates;
