use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no token: liveness and account registration.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Load balancer health check.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Creates a user and hands back its first bearer token.
        .route("/register", post(handlers::register_user))
}
