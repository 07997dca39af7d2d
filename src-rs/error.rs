use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Every failure the pollen endpoint can report to a caller. Client-visible
/// messages are fixed strings; diagnostic detail only goes to the log.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after_secs: u64 },
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Missing latitude or longitude")]
    MissingCoordinates,
    #[error("Invalid latitude or longitude")]
    InvalidCoordinates,
    #[error("API key not configured")]
    ApiKeyNotConfigured,
    #[error("Failed to fetch pollen data")]
    Upstream { status: StatusCode },
    #[error("Internal server error")]
    Internal,
    #[error("Not found")]
    NotFound,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingCoordinates | ProxyError::InvalidCoordinates => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::ApiKeyNotConfigured | ProxyError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Upstream { status } => *status,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let retry_after = match self {
            ProxyError::RateLimited { retry_after_secs } => Some(retry_after_secs),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            retry_after,
        };

        let mut response = (self.status(), Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn rate_limited_carries_retry_hint() {
        let response = ProxyError::RateLimited {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "42");
        let body = body_json(response).await;
        assert_eq!(body["retryAfter"], 42);
        assert_eq!(body["error"], "Too many requests. Please try again later.");
    }

    #[tokio::test]
    async fn upstream_errors_keep_status_and_hide_details() {
        let response = ProxyError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch pollen data" }));
    }

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(ProxyError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ProxyError::MissingCoordinates.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::ApiKeyNotConfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ProxyError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
