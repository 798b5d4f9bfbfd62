use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use crate::{
    dto::candidate_dto::{
        CreateCandidatePayload, MessageResponse, UpdateCandidatePayload, UpdateStatusPayload,
    },
    error::{Error, ErrorResponse, Result},
    models::candidate::Candidate,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/candidates",
            get(list_candidates).post(create_candidate),
        )
        .route("/api/candidates/all-skills", get(list_all_skills))
        .route(
            "/api/candidates/:id",
            get(get_candidate)
                .put(update_candidate)
                .delete(delete_candidate),
        )
        .route("/api/candidates/:id/status", patch(update_candidate_status))
}

fn parse_id(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| Error::BadRequest("Invalid candidate ID".to_string()))
}

/// Collapses a store failure into the endpoint's fixed 500 message after
/// logging the real cause.
fn store_failure(operation: &'static str, message: &'static str) -> impl FnOnce(Error) -> Error {
    move |err| {
        tracing::error!(operation, error = %err, "Candidate store operation failed");
        Error::Internal(message.to_string())
    }
}

#[utoipa::path(
    get,
    path = "/api/candidates",
    tag = "candidates",
    responses(
        (status = 200, description = "All candidates, newest first", body = [Candidate]),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let candidates = state
        .candidate_service
        .list_candidates()
        .await
        .map_err(store_failure("GET /api/candidates", "Failed to fetch candidates"))?;
    Ok(Json(candidates))
}

#[utoipa::path(
    get,
    path = "/api/candidates/all-skills",
    tag = "candidates",
    responses(
        (status = 200, description = "Every known skill name, alphabetical", body = [String]),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_all_skills(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let skills = state.candidate_service.list_skill_names().await.map_err(store_failure(
        "GET /api/candidates/all-skills",
        "Failed to fetch skills",
    ))?;
    Ok(Json(skills))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    tag = "candidates",
    params(
        ("id" = i32, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate found", body = Candidate),
        (status = 400, description = "Invalid candidate ID", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let candidate = state
        .candidate_service
        .get_candidate(id)
        .await
        .map_err(store_failure("GET /api/candidates/:id", "Failed to fetch candidate"))?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/api/candidates",
    tag = "candidates",
    request_body = CreateCandidatePayload,
    responses(
        (status = 201, description = "Candidate created", body = Candidate),
        (status = 400, description = "Invalid payload or email already exists", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateCandidatePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let new = payload.into_new_candidate()?;
    let candidate = state
        .candidate_service
        .create_candidate(new)
        .await
        .map_err(store_failure("POST /api/candidates", "Failed to create candidate"))?
        .into_result()?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    put,
    path = "/api/candidates/{id}",
    tag = "candidates",
    params(
        ("id" = i32, Path, description = "Candidate ID")
    ),
    request_body = UpdateCandidatePayload,
    responses(
        (status = 200, description = "Candidate updated", body = Candidate),
        (status = 400, description = "Invalid ID, payload, or email already exists", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateCandidatePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let changes = payload.into_changes()?;
    let candidate = state
        .candidate_service
        .update_candidate(id, changes)
        .await
        .map_err(store_failure("PUT /api/candidates/:id", "Failed to update candidate"))?
        .into_result()?;
    Ok(Json(candidate))
}

#[utoipa::path(
    patch,
    path = "/api/candidates/{id}/status",
    tag = "candidates",
    params(
        ("id" = i32, Path, description = "Candidate ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Candidate),
        (status = 400, description = "Invalid ID or status", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn update_candidate_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateStatusPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let status = payload.into_status()?;
    let candidate = state
        .candidate_service
        .update_status(id, status)
        .await
        .map_err(store_failure(
            "PATCH /api/candidates/:id/status",
            "Failed to update status",
        ))?
        .into_result()?;
    Ok(Json(candidate))
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}",
    tag = "candidates",
    params(
        ("id" = i32, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate deleted", body = MessageResponse),
        (status = 400, description = "Invalid candidate ID", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    state
        .candidate_service
        .delete_candidate(id)
        .await
        .map_err(store_failure("DELETE /api/candidates/:id", "Failed to delete candidate"))?
        .into_result()?;
    Ok(Json(MessageResponse {
        message: "Candidate deleted successfully".to_string(),
    }))
}
