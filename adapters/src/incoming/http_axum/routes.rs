use axum::{
    Router,
    routing::{get, post},
};
#[cfg(feature = "docs")]
use utoipa::OpenApi;
#[cfg(feature = "docs")]
use utoipa_swagger_ui::SwaggerUi;

use crate::incoming::http_axum::{
    handlers::{
        files::{download_all_posters, download_poster, preview_poster},
        health::health_check,
        posters::{cancel_poster, create_poster, poster_progress},
        themes::list_themes,
    },
    router_ext::RouterExt,
};
use crate::shared::app_state::AppState;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::docs::ApiDoc;

pub fn build_application_router() -> Router<AppState> {
    build_core_routes()
        .merge(build_poster_routes())
        .merge(build_file_routes())
}

fn build_core_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/themes", get(list_themes));

    #[cfg(feature = "docs")]
    {
        router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    #[cfg(not(feature = "docs"))]
    {
        router
    }
}

fn build_poster_routes() -> Router<AppState> {
    Router::new()
        .route("/api/posters", post(create_poster))
        .route("/api/create_poster", post(create_poster))
        .route("/api/progress/{task_id}", get(poster_progress))
        .route("/api/cancel/{task_id}", post(cancel_poster))
        .with_request_id()
}

fn build_file_routes() -> Router<AppState> {
    Router::new()
        .route("/api/download/{task_id}", get(download_poster))
        .route("/api/preview/{task_id}", get(preview_poster))
        .route("/api/download_all/{task_id}", get(download_all_posters))
        .with_request_id()
}
