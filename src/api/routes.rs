//! API Route Definitions
//!
//! HTTP routes for the magic-link flow, built through a RouterBuilder so
//! deployments can expose only the endpoints they need (for example a
//! verification-only service behind a different gateway stage).

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{submit_registration, verify_link, AppState};

/// Builder for creating API routes with configurable endpoints
#[derive(Default)]
pub struct RouterBuilder {
    /// Whether to enable the registration submission endpoint (POST /account)
    submit_registration: bool,
    /// Whether to enable the link verification endpoint (GET /verify)
    verify_link: bool,
}

impl RouterBuilder {
    /// Creates a new router builder with all routes disabled by default
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with all routes enabled
    pub fn with_all_routes() -> Self {
        Self {
            submit_registration: true,
            verify_link: true,
        }
    }

    /// Enables or disables the registration submission endpoint (POST /account)
    pub fn submit_registration(mut self, enabled: bool) -> Self {
        self.submit_registration = enabled;
        self
    }

    /// Enables or disables the link verification endpoint (GET /verify)
    pub fn verify_link(mut self, enabled: bool) -> Self {
        self.verify_link = enabled;
        self
    }

    /// Build the router with the enabled routes
    pub fn build(self, state: AppState) -> Router {
        let mut router = Router::new();

        if self.submit_registration {
            router = router.route("/account", post(submit_registration));
        }
        if self.verify_link {
            router = router.route("/verify", get(verify_link));
        }

        router.with_state(state)
    }
}

/// Create a router with all routes enabled
pub fn create_routes(state: AppState) -> Router {
    RouterBuilder::with_all_routes().build(state)
}
