use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "message": "Candidate Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    });
    (StatusCode::OK, Json(body))
}
