use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::info;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Propagates the caller's `X-Request-Id` or assigns a fresh one, and logs
/// poster submissions with it.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);

    let request_path = request.uri().path().to_string();
    let request_method = request.method().to_string();
    let is_job_submission = request.method() == "POST"
        && matches!(request_path.as_str(), "/api/posters" | "/api/create_poster");

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    if is_job_submission {
        info!(
            request_id = %request_id,
            method = %request_method,
            path = %request_path,
            "Processing poster submission"
        );
    }

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    if is_job_submission {
        info!(
            request_id = %request_id,
            status = %response.status(),
            "Poster submission completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn echoes_incoming_request_id() {
        let response = app()
            .oneshot(
                HttpRequest::get("/ping")
                    .header(REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).expect("header"),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn assigns_request_id_when_missing() {
        let response = app()
            .oneshot(HttpRequest::get("/ping").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        let id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .expect("header");
        assert!(Uuid::parse_str(id).is_ok());
    }
}
