use axum::http::StatusCode;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ErrorBody;
use crate::completion::CompletionError;

/// Everything the documentation endpoint can reject a request with. Each
/// variant renders as `{"error": <message>}` with its mapped status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Code is required and cannot be empty")]
    EmptyCode,
    #[error("Language is required")]
    EmptyLanguage,
    #[error("Code is too long (max 10,000 characters)")]
    CodeTooLong,
    #[error("Service configuration error")]
    MissingConfiguration,
    #[error("Documentation generation failed: {0}")]
    Generation(#[from] CompletionError),
    #[error("Failed to generate documentation")]
    EmptyDocumentation,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidJson
            | ApiError::EmptyCode
            | ApiError::EmptyLanguage
            | ApiError::CodeTooLong => StatusCode::BAD_REQUEST,
            ApiError::MissingConfiguration
            | ApiError::Generation(_)
            | ApiError::EmptyDocumentation
            | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyCode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MissingConfiguration.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Generation(CompletionError::Timeout).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_generation_message_includes_cause() {
        let err = ApiError::Generation(CompletionError::Timeout);
        assert_eq!(
            err.to_string(),
            "Documentation generation failed: request timed out"
        );
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ApiError::EmptyCode.to_string(),
            "Code is required and cannot be empty"
        );
        assert_eq!(ApiError::EmptyLanguage.to_string(), "Language is required");
        assert_eq!(
            ApiError::CodeTooLong.to_string(),
            "Code is too long (max 10,000 characters)"
        );
    }
}
