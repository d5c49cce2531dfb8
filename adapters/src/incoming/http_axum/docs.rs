use crate::incoming::http_axum::{dto, handlers};
use domain::{
    color::RgbColor,
    dataset::DatasetKind,
    job::{JobFailure, JobFailureKind, JobId, JobSnapshot, Phase},
    poster::{ArtifactDescriptor, OutputFormat, Quality, SizeUnit},
    theme::ThemeSpec,
};
use dto::common_responses::{
    BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, PosterArchiveBodyResponse,
    PosterFileBodyResponse, ValidationErrorResponse,
};
use dto::requests::CreatePosterRequest;
use dto::responses::{
    ApiResponseValue, HealthResponse, JobStatusReply, PosterStartedResponse, ThemesResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::themes::list_themes,
        handlers::posters::create_poster,
        handlers::posters::poster_progress,
        handlers::posters::cancel_poster,
        handlers::files::download_poster,
        handlers::files::preview_poster,
        handlers::files::download_all_posters,
    ),
    components(
        schemas(
            ApiResponseValue,
            HealthResponse,
            ThemesResponse,
            CreatePosterRequest,
            PosterStartedResponse,
            JobStatusReply,
            JobSnapshot,
            JobId,
            Phase,
            JobFailure,
            JobFailureKind,
            DatasetKind,
            ArtifactDescriptor,
            OutputFormat,
            Quality,
            SizeUnit,
            ThemeSpec,
            RgbColor
        ),
        responses(
            BadRequestResponse,
            ValidationErrorResponse,
            NotFoundResponse,
            InternalServerErrorResponse,
            PosterFileBodyResponse,
            PosterArchiveBodyResponse
        )
    ),
    tags(
        (name = "posters", description = "Poster jobs - submit a request, poll its progress, and cancel it"),
        (name = "files", description = "Rendered poster files - download as attachment, preview inline, or fetch all themes as ZIP"),
        (name = "themes", description = "Colour themes available for rendering"),
        (name = "system", description = "Service health")
    ),
    info(
        title = "City Poster API",
        description = "Generates minimalist city map posters from OpenStreetMap data. Street, water and park layers are fetched in parallel through a content-addressed disk cache, and rendering runs as a background job with progress reporting.",
        contact(
            name = "City Poster",
        ),
    ),
    servers(
        (url = "http://localhost:5000", description = "Development server"),
    )
)]
pub struct ApiDoc;
