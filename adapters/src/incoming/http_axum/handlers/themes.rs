use axum::{Json, extract::State};

use crate::incoming::http_axum::{dto::responses::ThemesResponse, error_mapper::HttpError};
use crate::shared::app_state::AppState;
#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::common_responses::InternalServerErrorResponse;

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/api/themes",
    responses(
        (status = 200, description = "Selectable theme identifiers", body = ThemesResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "themes",
    summary = "List themes",
    description = "Sorted identifiers of every theme file in the themes directory. `feature_based` is always present.",
    operation_id = "list_themes"
))]
pub async fn list_themes(State(state): State<AppState>) -> Result<Json<ThemesResponse>, HttpError> {
    let themes = state.themes.list_themes().map_err(HttpError)?;
    Ok(Json(ThemesResponse { themes }))
}
