use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_valid::Valid;

use cityposter_application::{error::AppError, posters::request::PosterRequest};

use crate::incoming::http_axum::{
    core::extractors::parse_job_id,
    dto::{
        requests::CreatePosterRequest,
        responses::{JobStatusReply, PosterStartedResponse},
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::{
    InternalServerErrorResponse, ValidationErrorResponse,
};
#[cfg(feature = "docs")]
use domain::job::JobSnapshot;

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(JobStatusReply::NOT_FOUND)).into_response()
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/api/posters",
    request_body = CreatePosterRequest,
    responses(
        (status = 200, description = "Job accepted and running in the background", body = PosterStartedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "posters",
    summary = "Start a poster job",
    description = "Validate the request shape and start generating one poster per selected theme. Location, theme and canvas problems surface later as a failed job.",
    operation_id = "create_poster"
))]
pub async fn create_poster(
    State(state): State<AppState>,
    Valid(Json(body)): Valid<Json<CreatePosterRequest>>,
) -> Result<Json<PosterStartedResponse>, HttpError> {
    let task_id = state
        .poster_jobs
        .submit_job(PosterRequest::from(body))
        .map_err(HttpError)?;

    Ok(Json(PosterStartedResponse::new(task_id)))
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/api/progress/{task_id}",
    params(("task_id" = String, Path, description = "Job identifier returned on submission")),
    responses(
        (status = 200, description = "Current job snapshot", body = JobSnapshot),
        (status = 404, description = "Unknown job", body = JobStatusReply,
         example = json!({ "status": "not_found" }))
    ),
    tag = "posters",
    summary = "Poll job progress",
    operation_id = "poster_progress"
))]
pub async fn poster_progress(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, HttpError> {
    let Some(job_id) = parse_job_id(&task_id) else {
        return Ok(not_found());
    };

    match state.poster_jobs.job_status(job_id) {
        Ok(snapshot) => Ok(Json(snapshot).into_response()),
        Err(AppError::NotFound { .. }) => Ok(not_found()),
        Err(e) => Err(HttpError(e)),
    }
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/api/cancel/{task_id}",
    params(("task_id" = String, Path, description = "Job identifier returned on submission")),
    responses(
        (status = 200, description = "Cancellation requested", body = JobStatusReply,
         example = json!({ "status": "cancelling" })),
        (status = 404, description = "Unknown job", body = JobStatusReply,
         example = json!({ "status": "not_found" }))
    ),
    tag = "posters",
    summary = "Cancel a job",
    description = "Flag the job as cancelled. The job stops at its next checkpoint and ends in the error state with a cancelled failure.",
    operation_id = "cancel_poster"
))]
pub async fn cancel_poster(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, HttpError> {
    let Some(job_id) = parse_job_id(&task_id) else {
        return Ok(not_found());
    };

    match state.poster_jobs.cancel_job(job_id) {
        Ok(()) => Ok(Json(JobStatusReply::CANCELLING).into_response()),
        Err(AppError::NotFound { .. }) => Ok(not_found()),
        Err(e) => Err(HttpError(e)),
    }
}
