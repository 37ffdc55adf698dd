use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// API Router Module
///
/// Machine-facing endpoints. None of them require a session: the guard's
/// decisions are computed for whatever session the caller presents.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/routes
        // The compiled route table with inherited metadata.
        .route("/api/routes", get(handlers::list_routes))
        // POST /api/navigate
        // Guard decision for a transition, evaluated but not applied.
        .route("/api/navigate", post(handlers::navigate))
}
