use axum::{
    http::{
        HeaderMap, HeaderValue,
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use domain::job::JobId;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Standard API response wrapper with success indicator, optional error message, and optional data payload",
    example = json!({
        "ok": true,
        "data": {
            "status": "ok",
            "jobs": 3
        }
    })
))]
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success_with_data(data: Option<T>) -> Self {
        Self {
            ok: true,
            error: None,
            data,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    #[cfg_attr(feature = "docs", schema(example = "ok"))]
    pub status: &'static str,
    /// Jobs currently held in the registry.
    #[cfg_attr(feature = "docs", schema(example = 3))]
    pub jobs: usize,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    example = json!({ "themes": ["autumn", "feature_based", "noir"] })
))]
#[derive(Debug, Clone, Serialize)]
pub struct ThemesResponse {
    pub themes: Vec<String>,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    example = json!({
        "task_id": "550e8400-e29b-41d4-a716-446655440000",
        "status": "started"
    })
))]
#[derive(Debug, Clone, Serialize)]
pub struct PosterStartedResponse {
    pub task_id: JobId,
    pub status: &'static str,
}

impl PosterStartedResponse {
    #[must_use]
    pub fn new(task_id: JobId) -> Self {
        Self {
            task_id,
            status: "started",
        }
    }
}

/// Bare `{ "status": .. }` body used by cancel and unknown job replies.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusReply {
    #[cfg_attr(feature = "docs", schema(example = "cancelling"))]
    pub status: &'static str,
}

impl JobStatusReply {
    pub const CANCELLING: Self = Self {
        status: "cancelling",
    };
    pub const NOT_FOUND: Self = Self {
        status: "not_found",
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

/// Poster file body with its content headers.
pub struct PosterFileResponse {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
    pub disposition: Disposition,
}

impl IntoResponse for PosterFileResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-transform"));

        let kind = match self.disposition {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        };
        let safe_name = self.file_name.replace(['"', '\\'], "");
        if let Ok(disposition) = HeaderValue::from_str(&format!("{kind}; filename=\"{safe_name}\"")) {
            headers.insert(CONTENT_DISPOSITION, disposition);
        } else if let Ok(disposition) = HeaderValue::from_str(kind) {
            headers.insert(CONTENT_DISPOSITION, disposition);
        }

        (headers, self.bytes).into_response()
    }
}

#[cfg(feature = "docs")]
#[derive(serde::Serialize, utoipa::ToSchema)]
#[schema(title = "ApiResponseValue")]
pub struct ApiResponseValue {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
