use axum::Json;
use utoipa::OpenApi;

use crate::dto::candidate_dto::{
    CreateCandidatePayload, MessageResponse, UpdateCandidatePayload, UpdateStatusPayload,
};
use crate::error::ErrorResponse;
use crate::models::candidate::{Candidate, CandidateStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Candidate Management API",
        description = "Candidates, their statuses and skills."
    ),
    paths(
        crate::routes::health::health,
        crate::routes::candidate_routes::list_candidates,
        crate::routes::candidate_routes::list_all_skills,
        crate::routes::candidate_routes::get_candidate,
        crate::routes::candidate_routes::create_candidate,
        crate::routes::candidate_routes::update_candidate,
        crate::routes::candidate_routes::update_candidate_status,
        crate::routes::candidate_routes::delete_candidate,
    ),
    components(schemas(
        Candidate,
        CandidateStatus,
        CreateCandidatePayload,
        UpdateCandidatePayload,
        UpdateStatusPayload,
        MessageResponse,
        ErrorResponse,
    )),
    tags(
        (name = "candidates", description = "Candidate CRUD and skill catalogue")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
