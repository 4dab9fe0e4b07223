use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::generation::GenerationError;

/// Application error type. Every variant maps to exactly one user-facing
/// status; handlers never construct ad-hoc status/message pairs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("a meal plan with this name already exists")]
    DuplicateName,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("failed to generate meal plan")]
    Generation(#[from] GenerationError),

    #[error("malformed plan document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateName => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Generation(_)
            | ApiError::Decode(_)
            | ApiError::Store(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Generation(e) => error!(error = %e, "generation failed"),
                ApiError::Decode(e) => error!(error = %e, "plan decode failed"),
                ApiError::Store(e) => error!(error = %e, "store operation failed"),
                ApiError::Internal(e) => error!(error = %e, "unexpected error"),
                _ => {}
            }
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_variant_maps_to_its_status() {
        assert_eq!(
            ApiError::Validation("Missing required data".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateName.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Generation(GenerationError::Api("rate limited".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            ApiError::Decode(bad_json).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_name_message_is_stable() {
        assert_eq!(
            ApiError::DuplicateName.to_string(),
            "a meal plan with this name already exists"
        );
    }
}
