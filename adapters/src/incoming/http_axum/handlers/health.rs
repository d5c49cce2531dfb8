use axum::{Json, extract::State};

use crate::incoming::http_axum::dto::responses::{ApiResponse, HealthResponse};
use crate::shared::app_state::AppState;
#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::responses::ApiResponseValue;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = ApiResponseValue,
         example = json!({
             "ok": true,
             "data": {
                 "status": "ok",
                 "jobs": 3
             }
         })
        )
    ),
    tag = "system",
    summary = "Liveness check",
    description = "Report that the service is running together with the number of jobs held in memory.",
    operation_id = "health_check"
))]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success_with_data(Some(HealthResponse {
        status: "ok",
        jobs: state.poster_jobs.job_count(),
    })))
}
