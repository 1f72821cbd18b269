use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Which of the two concurrent generation calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Narrative,
    Structured,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStage::Narrative => f.write_str("narrative"),
            GenerationStage::Structured => f.write_str("structured"),
        }
    }
}

/// Why a user cannot be used as the subject of a similarity query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    NotFound,
    MissingEmbedding,
    MissingInterests,
}

impl std::fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IneligibleReason::NotFound => f.write_str("user does not exist"),
            IneligibleReason::MissingEmbedding => f.write_str("user has no embedding"),
            IneligibleReason::MissingInterests => f.write_str("user has no interests"),
        }
    }
}

/// Failures of the profile enrichment and similarity pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported resume format: {0}")]
    UnsupportedFormat(String),

    #[error("Resume text extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("{stage} generation failed: {message}")]
    GenerationFailed {
        stage: GenerationStage,
        message: String,
    },

    #[error("Structured profile could not be parsed: {reason}")]
    StructuredParseFailed { reason: String, raw_text: String },

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("User {idfv} cannot be used for similarity search: {reason}")]
    IneligibleQueryUser {
        idfv: String,
        reason: IneligibleReason,
    },

    #[error("User {0} not found")]
    UserNotFound(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(err) => pipeline_status(err),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
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

fn pipeline_status(err: &PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::UnsupportedFormat(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_FORMAT",
            err.to_string(),
        ),
        PipelineError::ExtractionFailed(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "EXTRACTION_FAILED",
            err.to_string(),
        ),
        PipelineError::GenerationFailed { stage, message } => {
            tracing::error!("{stage} generation failed: {message}");
            (
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                format!("The {stage} profile could not be generated"),
            )
        }
        PipelineError::StructuredParseFailed { reason, raw_text } => {
            tracing::error!(
                raw_len = raw_text.len(),
                "Structured profile parse failed: {reason}"
            );
            (
                StatusCode::BAD_GATEWAY,
                "STRUCTURED_PARSE_FAILED",
                "The structured profile returned by the model was invalid".to_string(),
            )
        }
        PipelineError::EmbeddingFailed(msg) => {
            tracing::error!("Embedding error: {msg}");
            (
                StatusCode::BAD_GATEWAY,
                "EMBEDDING_FAILED",
                "The profile embedding could not be generated".to_string(),
            )
        }
        PipelineError::IneligibleQueryUser {
            reason: IneligibleReason::NotFound,
            ..
        } => (StatusCode::NOT_FOUND, "INELIGIBLE_QUERY_USER", err.to_string()),
        PipelineError::IneligibleQueryUser { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INELIGIBLE_QUERY_USER",
            err.to_string(),
        ),
        PipelineError::UserNotFound(_) => {
            (StatusCode::NOT_FOUND, "USER_NOT_FOUND", err.to_string())
        }
    }
}
