pub mod client;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::services::candidate_service::CandidateService;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub candidate_service: CandidateService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let candidate_service = CandidateService::new(pool.clone());
        Self {
            pool,
            candidate_service,
        }
    }
}

/// The full HTTP surface with CORS, tracing and the body limit applied.
pub fn build_app(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(routes::health::health))
        .route("/health", get(routes::health::health))
        .route("/api/openapi.json", get(routes::openapi::openapi_json))
        .merge(routes::candidate_routes::router())
        .with_state(state)
        .layer(middleware::cors::cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
