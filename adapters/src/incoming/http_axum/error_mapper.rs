use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use cityposter_application::error::AppError;

pub struct HttpError(pub AppError);

impl HttpError {
    fn status_and_message(&self) -> (StatusCode, String) {
        let app_error = &self.0;
        match app_error {
            AppError::Domain(_) | AppError::InvalidInput { .. } | AppError::ThemeNotFound { .. } => {
                (StatusCode::BAD_REQUEST, app_error.to_string())
            }

            AppError::JsonError(_) => (StatusCode::BAD_REQUEST, "Invalid JSON format".to_string()),

            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),

            AppError::DataUnavailable { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, app_error.to_string())
            }

            AppError::Cancelled => (StatusCode::CONFLICT, app_error.to_string()),

            AppError::ProviderFailure(_) => (
                StatusCode::BAD_GATEWAY,
                "Geodata provider error".to_string(),
            ),

            AppError::Cache(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Cache error".to_string()),

            AppError::RenderError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Render error".to_string())
            }

            AppError::ConfigError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
            ),

            AppError::IoError(_) | AppError::TaskError { .. } | AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status_code, message) = self.status_and_message();

        if status_code.is_server_error() {
            error!("Server error response generated: {}", self.0);
        } else {
            debug!("Client error response generated: {}", self.0);
        }

        let error_response = json!({
            "ok": false,
            "error": message,
            "status": status_code.as_u16()
        });

        (status_code, Json(error_response)).into_response()
    }
}

impl From<AppError> for HttpError {
    fn from(app_error: AppError) -> Self {
        HttpError(app_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;
    use std::io;

    #[rstest]
    #[case(AppError::InvalidInput { message: "missing city".to_string() }, StatusCode::BAD_REQUEST)]
    #[case(AppError::ThemeNotFound { name: "neon".to_string() }, StatusCode::BAD_REQUEST)]
    #[case(AppError::NotFound { message: "File not found".to_string() }, StatusCode::NOT_FOUND)]
    #[case(AppError::Cancelled, StatusCode::CONFLICT)]
    #[case(AppError::RenderError { message: "disk full".to_string() }, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(AppError::IoError(io::Error::other("boom")), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_errors_to_status_codes(#[case] error: AppError, #[case] expected: StatusCode) {
        assert_eq!(HttpError(error).into_response().status(), expected);
    }

    #[tokio::test]
    async fn body_hides_internal_details() {
        let response = HttpError(AppError::IoError(io::Error::other("/secret/path"))).into_response();

        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");

        assert_eq!(json["ok"], false);
        assert_eq!(json["status"], 500);
        assert_eq!(json["error"], "Internal server error");
    }
}
