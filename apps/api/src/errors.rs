use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// The only hard failure the screening engine raises: a candidate record that
/// is structurally invalid. Missing or malformed *contents* never fail.
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("candidate record must be a JSON object")]
    NotAnObject,

    #[error("candidate record is missing required field '{0}' (send an empty placeholder instead)")]
    MissingField(&'static str),
}

/// Decision thresholds that cannot be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("thresholds must be within 0-100 (interview={interview}, hold={hold})")]
    OutOfRange { interview: u32, hold: u32 },

    #[error("hold threshold {hold} exceeds interview threshold {interview}")]
    Inverted { interview: u32, hold: u32 },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Invalid candidate: {0}")]
    InvalidCandidate(#[from] ScreeningError),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(#[from] ThresholdError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidThresholds(e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::InvalidCandidate(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_CANDIDATE",
                e.to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The text-generation service failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
