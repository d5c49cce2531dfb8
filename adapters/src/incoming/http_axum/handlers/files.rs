use std::io::{self, ErrorKind};

use axum::extract::{Path, Query, State};
use tokio::{fs, task};
use tracing::warn;

use cityposter_application::error::AppError;

use crate::incoming::http_axum::{
    core::{
        archive::{ArchiveEntry, zip_entries},
        extractors::parse_job_id,
    },
    dto::{
        requests::ArtifactQuery,
        responses::{Disposition, PosterFileResponse},
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::{
    InternalServerErrorResponse, NotFoundResponse, PosterArchiveBodyResponse,
    PosterFileBodyResponse,
};

fn file_not_found() -> HttpError {
    HttpError(AppError::NotFound {
        message: "File not found".to_string(),
    })
}

async fn poster_file(
    state: &AppState,
    task_id: &str,
    query: &ArtifactQuery,
    disposition: Disposition,
) -> Result<PosterFileResponse, HttpError> {
    let job_id = parse_job_id(task_id).ok_or_else(file_not_found)?;
    let artifact = state
        .poster_artifacts
        .artifact(job_id, query.index())
        .map_err(HttpError)?;

    let bytes = match fs::read(&artifact.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(%job_id, path = %artifact.path.display(), "Poster file vanished from disk");
            return Err(file_not_found());
        }
        Err(e) => return Err(HttpError(AppError::IoError(e))),
    };

    Ok(PosterFileResponse {
        bytes,
        content_type: artifact.descriptor.format.mime_type(),
        file_name: artifact.download_name,
        disposition,
    })
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/api/download/{task_id}",
    params(
        ("task_id" = String, Path, description = "Job identifier"),
        ("index" = Option<i64>, Query, description = "File index; clamped into range, non-integers select the first file")
    ),
    responses(
        (status = 200, response = PosterFileBodyResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "files",
    summary = "Download a poster",
    description = "Serve one rendered poster of a completed job as an attachment.",
    operation_id = "download_poster"
))]
pub async fn download_poster(
    Path(task_id): Path<String>,
    Query(query): Query<ArtifactQuery>,
    State(state): State<AppState>,
) -> Result<PosterFileResponse, HttpError> {
    poster_file(&state, &task_id, &query, Disposition::Attachment).await
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/api/preview/{task_id}",
    params(
        ("task_id" = String, Path, description = "Job identifier"),
        ("index" = Option<i64>, Query, description = "File index; clamped into range, non-integers select the first file")
    ),
    responses(
        (status = 200, response = PosterFileBodyResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "files",
    summary = "Preview a poster",
    description = "Serve one rendered poster inline so browsers display it.",
    operation_id = "preview_poster"
))]
pub async fn preview_poster(
    Path(task_id): Path<String>,
    Query(query): Query<ArtifactQuery>,
    State(state): State<AppState>,
) -> Result<PosterFileResponse, HttpError> {
    poster_file(&state, &task_id, &query, Disposition::Inline).await
}

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/api/download_all/{task_id}",
    params(
        ("task_id" = String, Path, description = "Job identifier")
    ),
    responses(
        (status = 200, response = PosterArchiveBodyResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "files",
    summary = "Download every theme as ZIP",
    description = "Bundle all rendered posters of a completed job into one ZIP archive, one `{theme}.{ext}` entry per file.",
    operation_id = "download_all_posters"
))]
pub async fn download_all_posters(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<PosterFileResponse, HttpError> {
    let job_id = parse_job_id(&task_id).ok_or_else(file_not_found)?;
    let bundle = state
        .poster_artifacts
        .artifact_bundle(job_id)
        .map_err(HttpError)?;

    let mut entries = Vec::with_capacity(bundle.artifacts.len());
    for artifact in &bundle.artifacts {
        match fs::read(&artifact.path).await {
            Ok(bytes) => entries.push(ArchiveEntry {
                name: format!(
                    "{}.{}",
                    artifact.descriptor.theme,
                    artifact.descriptor.format.extension()
                ),
                bytes,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(%job_id, path = %artifact.path.display(), "Skipping poster missing from disk");
            }
            Err(e) => return Err(HttpError(AppError::IoError(e))),
        }
    }
    if entries.is_empty() {
        return Err(file_not_found());
    }

    let bytes = task::spawn_blocking(move || zip_entries(&entries))
        .await
        .map_err(|e| {
            HttpError(AppError::TaskError {
                message: format!("Archive task failed: {e}"),
            })
        })?
        .map_err(|e| HttpError(AppError::IoError(io::Error::other(e))))?;

    Ok(PosterFileResponse {
        bytes,
        content_type: "application/zip",
        file_name: bundle.archive_name,
        disposition: Disposition::Attachment,
    })
}
