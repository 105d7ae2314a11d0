//! Error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use repovitals_analyzer::{AnalysisError, FailureKind, StoreError};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis_id: Option<String>,
}

/// An error rendered as `{ "error": ..., "analysis_id"?: ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    analysis_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            analysis_id: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::not_found(format!("Analysis not found: {}", what)),
            StoreError::Backend(message) => {
                error!(error = %message, "Storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store analysis")
            }
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InvalidUrl(url) => {
                Self::bad_request(format!("Invalid GitHub repository URL: {}", url))
            }
            AnalysisError::Store(e) => e.into(),
            AnalysisError::Failed {
                analysis_id,
                kind,
                message,
            } => {
                let status = match kind {
                    FailureKind::RepoNotFound => StatusCode::NOT_FOUND,
                    FailureKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    FailureKind::Fetch | FailureKind::Timeout => StatusCode::BAD_GATEWAY,
                };
                Self {
                    status,
                    message,
                    analysis_id: Some(analysis_id),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            analysis_id: self.analysis_id,
        };
        (self.status, Json(body)).into_response()
    }
}
