use reqwest::{Response, StatusCode};

use cityposter_application::ports::outgoing::geo_provider::ProviderError;

const PREVIEW_CHAR_LIMIT: usize = 160;

pub(super) fn map_transport_error(error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(error.to_string())
    } else {
        ProviderError::transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> ProviderError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::timeout(message),
        _ if status.is_client_error() => ProviderError::invalid_request(message),
        _ => ProviderError::status(status.as_u16(), message),
    }
}

/// Reads the whole body, turning non-2xx answers into provider errors.
pub(super) async fn success_body(response: Response) -> Result<Vec<u8>, ProviderError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| map_transport_error(&e))?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(body.to_vec())
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "rate_limited")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "timeout")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "invalid_request")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "status")]
    fn maps_http_statuses_to_provider_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"remark\": \"runtime error\"}");
        let matched = match expected {
            "rate_limited" => matches!(error, ProviderError::RateLimited { .. }),
            "timeout" => matches!(error, ProviderError::Timeout { .. }),
            "invalid_request" => matches!(error, ProviderError::InvalidRequest { .. }),
            "status" => matches!(error, ProviderError::Status { status: 500, .. }),
            _ => panic!("unsupported expectation: {expected}"),
        };
        assert!(matched, "{status} mapped to {error:?}");
    }

    #[test]
    fn body_preview_is_compacted_and_truncated() {
        let body = format!("  line one\n\n line two {}", "x".repeat(400));
        let preview = body_preview(body.as_bytes());

        assert!(preview.starts_with("line one line two"));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
    }
}
