//! Error envelope: every failure becomes `{"detail": "..."}` with a matching status.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lexalyze_ai::AnalysisError;
use lexalyze_core::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not a valid `{"text": string}` document.
    #[error("{detail}")]
    InvalidBody { status: StatusCode, detail: String },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidBody { status, detail } => (status, detail),
            ApiError::Analysis(e) if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Analysis(e) => {
                tracing::error!(error = %e, "analysis failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
