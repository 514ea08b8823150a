//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// Error body: `{"detail": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub detail: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                detail: detail.into(),
            },
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// Malformed query or path parameters
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn rate_limited(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Upstream site could not be fetched
    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, detail)
    }

    pub fn detail(&self) -> &str {
        &self.response.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidParameter { .. } => Self::unprocessable(err.to_string()),
            DomainError::Fetch { .. } => Self::bad_gateway(format!("Fetching failed. last={}", err)),
            DomainError::Upstream { message } => Self::bad_gateway(message),
            DomainError::Configuration { .. }
            | DomainError::Internal { .. } => {
                error!("Internal error: {}", err);
                Self::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request_with_bare_message() {
        let err = ApiError::from(DomainError::validation("Only mangatek.com URLs allowed"));

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Only mangatek.com URLs allowed");
    }

    #[test]
    fn test_invalid_parameter_is_unprocessable() {
        let err = ApiError::from(DomainError::invalid_parameter("page", "must be >= 1"));

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail(), "Invalid parameter 'page': must be >= 1");
    }

    #[test]
    fn test_upstream_is_bad_gateway() {
        let err = ApiError::from(DomainError::upstream("Fetching failed. last=http fetch failed: HTTP 403"));

        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.detail(), "Fetching failed. last=http fetch failed: HTTP 403");
    }

    #[test]
    fn test_single_fetch_error_is_bad_gateway() {
        let err = ApiError::from(DomainError::fetch("http", "HTTP 500"));

        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.detail(), "Fetching failed. last=http fetch failed: HTTP 500");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(DomainError::configuration("bad proxy"));

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), "Internal server error");
    }

    #[test]
    fn test_body_shape() {
        let json = serde_json::to_value(ApiErrorResponse {
            detail: "x".to_string(),
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({"detail": "x"}));
    }
}
