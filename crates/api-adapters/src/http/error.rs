use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("too many requests")]
    RateLimited { retry_after_ms: u64 },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::RateLimited { retry_after_ms, .. } => ApiError::RateLimited { retry_after_ms },
            other @ (DomainError::Retrieval(_) | DomainError::Internal(_)) => {
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::RateLimited { retry_after_ms } => {
                let body = json!({
                    "error": self.to_string(),
                    "code": self.code(),
                    "ttl": retry_after_ms,
                });
                let mut response = (status, Json(body)).into_response();
                let seconds = retry_after_ms.div_ceil(1000).max(1);
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
                response
            }
            other => {
                let body = json!({ "error": other.to_string(), "code": other.code() });
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                DomainError::RateLimited {
                    key: "k".into(),
                    retry_after_ms: 10,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (DomainError::Retrieval("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            assert_eq!(ApiError::from(domain).status(), status);
        }
    }

    #[test]
    fn retrieval_message_is_preserved() {
        let err = ApiError::from(DomainError::Retrieval("connection reset".into()));
        assert_eq!(err, ApiError::Internal("post retrieval failed: connection reset".into()));
    }

    #[test]
    fn rate_limited_response_carries_retry_after_seconds() {
        let response = ApiError::RateLimited { retry_after_ms: 2_500 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
    }
}
