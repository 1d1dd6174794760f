use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        CreateJobPayload, JobListQuery, JobListResponse, JobResponse, JobStatsResponse,
        UpdateJobPayload,
    },
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(user.0, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("status" = Option<String>, Query, description = "Status literal, or `all`"),
        ("jobType" = Option<String>, Query, description = "Job type literal, or `all`"),
        ("search" = Option<String>, Query, description = "Substring of position or company"),
        ("sort" = Option<String>, Query, description = "latest, oldest, a-z or z-a"),
        ("page" = Option<String>, Query, description = "1-indexed page"),
        ("limit" = Option<String>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "One page of the caller's jobs", body = Json<JobListResponse>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.job_service.list(user.0, query).await?;
    Ok(Json(JobListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/stats",
    responses(
        (status = 200, description = "Jobs per status, zero-filled", body = Json<JobStatsResponse>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn job_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let stats = state.job_service.stats(user.0).await?;
    Ok(Json(JobStatsResponse::from(stats)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Json<JobResponse>),
        (status = 404, description = "Job not found or access denied")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get(user.0, id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found or access denied")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.update(user.0, id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job deleted"),
        (status = 404, description = "Job not found or access denied")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(user.0, id).await?;
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}
