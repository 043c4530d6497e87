//! Axum router configuration with middleware.
//!
//! All chat routes are under `/api/v1/`; `/health` sits at the root.
//! Middleware: CORS (any origin, method and header) and request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/messages", post(handlers::chat::send_message))
        .route("/sessions", post(handlers::session::create_session))
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route(
            "/sessions/{id}/messages/{message_id}/regenerate",
            post(handlers::chat::regenerate),
        )
        .route("/rate-limit", get(handlers::rate_limit::get_rate_limit))
        .route("/operations", post(handlers::operations::dispatch));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check. Does not call the upstream.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
