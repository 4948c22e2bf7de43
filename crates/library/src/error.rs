//! Request and startup errors.

use axum::Json;
use axum::response::{IntoResponse, Response};
use library_core::{ErrorCode, ErrorResponse, IntoErrorCode, RouteError, ValidationErrors};
use library_openapi::OpenApiError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::repository::RepositoryError;
use crate::telemetry::TelemetryError;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown or unparseable identifier
    #[error("No {model} matches the given query.")]
    NotFound { model: &'static str },

    /// No route matches the path
    #[error("Not found.")]
    RouteNotFound,

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Body is not well-formed JSON
    #[error("{0}")]
    MalformedBody(String),

    /// Body exceeds the request size limit
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type \"{0}\" in request.")]
    UnsupportedMediaType(String),

    #[error("Method \"{0}\" not allowed.")]
    MethodNotAllowed(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IntoErrorCode for ApiError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::NotFound { .. } | ApiError::RouteNotFound => ErrorCode::NotFound,
            ApiError::Validation(_) => ErrorCode::InvalidInput,
            ApiError::MalformedBody(_) => ErrorCode::ParseError,
            ApiError::PayloadTooLarge(_) => ErrorCode::PayloadTooLarge,
            ApiError::UnsupportedMediaType(_) => ErrorCode::UnsupportedMediaType,
            ApiError::MethodNotAllowed(_) => ErrorCode::MethodNotAllowed,
            ApiError::Repository(e) => e.error_code(),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.message(),
            ApiError::Repository(e) => e.message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        if code.is_server_error() {
            tracing::error!(error = %self, code = %code, "request failed");
        } else {
            tracing::debug!(error = %self, code = %code, "request rejected");
        }

        let mut body = ErrorResponse::from_error(&self);
        if let ApiError::Validation(errors) = &self
            && let Ok(details) = serde_json::to_value(errors)
        {
            body = body.with_details(details);
        }

        (code.status_code(), Json(body)).into_response()
    }
}

/// Errors that stop the binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("invalid route: {0}")]
    Route(#[from] RouteError),

    #[error("failed to build the OpenAPI document: {0}")]
    OpenApi(#[from] OpenApiError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::NotFound { model: "Book" }, StatusCode::NOT_FOUND),
            (ApiError::RouteNotFound, StatusCode::NOT_FOUND),
            (ApiError::Validation(ValidationErrors::new()), StatusCode::BAD_REQUEST),
            (ApiError::MalformedBody("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (
                ApiError::UnsupportedMediaType("text/plain".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                ApiError::MethodNotAllowed("TRACE".into()),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
            (
                ApiError::Repository(RepositoryError::MissingUrl),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::NotFound { model: "Book" }.message(),
            "No Book matches the given query."
        );
        assert_eq!(
            ApiError::MethodNotAllowed("PUT".into()).message(),
            "Method \"PUT\" not allowed."
        );
        assert_eq!(
            ApiError::Repository(RepositoryError::MissingUrl).message(),
            "A server error occurred."
        );
    }
}
