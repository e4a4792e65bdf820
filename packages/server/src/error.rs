use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::transcode::TranscodeError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `DECODE_ERROR`, `UNSUPPORTED_FORMAT`, `NOT_FOUND`,
    /// `UPSTREAM_UNAVAILABLE`, `PARTIAL_FAILURE`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Missing 'file' field")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// The uploaded payload claimed to be an image but could not be decoded.
    Decode(String),
    /// The payload is a valid image in a codec this service does not handle.
    UnsupportedFormat(String),
    NotFound(String),
    /// The storage backend did not answer, or answered non-success.
    UpstreamUnavailable(String),
    /// A deletion completed on one store but not the other.
    PartialFailure(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::Decode(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "DECODE_ERROR",
                    message: msg,
                },
            ),
            AppError::UnsupportedFormat(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "UNSUPPORTED_FORMAT",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::UpstreamUnavailable(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    code: "UPSTREAM_UNAVAILABLE",
                    message: msg,
                },
            ),
            AppError::PartialFailure(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "PARTIAL_FAILURE",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<TranscodeError> for AppError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::UnsupportedFormat(_) => AppError::UnsupportedFormat(err.to_string()),
            TranscodeError::Decode(_) => AppError::Decode(err.to_string()),
            // Re-encoding a successfully decoded image is a server fault,
            // not a client one.
            TranscodeError::Encode(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound => AppError::NotFound("Media not found".into()),
            PipelineError::BackendWrite(e) => {
                AppError::Internal(format!("Backend write failed: {e}"))
            }
            PipelineError::BackendRemoval(_) => AppError::PartialFailure(
                "Backend removal failed; the record was retained for retry".into(),
            ),
            PipelineError::MetadataRemoval(_) => AppError::PartialFailure(
                "Backend object removed but the metadata record could not be deleted".into(),
            ),
            PipelineError::ShortIdExhausted => {
                AppError::Internal("Short id generation exhausted".into())
            }
            PipelineError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}
