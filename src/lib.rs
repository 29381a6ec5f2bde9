//! Car marketplace booking service.
//!
//! JSON API around the test-drive availability and rental pricing engine in
//! [`booking`].

pub mod booking;
pub mod cache;
pub mod config;
pub mod error;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::booking::Clock;
use crate::cache::AppCache;
use crate::config::Config;

/// Shared state for every request handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(booking::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
