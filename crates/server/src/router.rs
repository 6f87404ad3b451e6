use axum::routing::{get, post};
use axum::Router;
use siteqa_knowledge::Services;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared handler state.
pub type AppState = Arc<Services>;

/// Creates the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/crawl", post(handlers::crawl))
        .route("/index", post(handlers::index))
        .route("/ask", post(handlers::ask))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
