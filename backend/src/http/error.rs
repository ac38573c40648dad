//! HTTP error handling and response types.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, PlannerError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Error raised by the planner
    Planner(PlannerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("BAD_REQUEST", msg),
            ),
            AppError::Planner(e) => {
                let code = match &e {
                    PlannerError::InvalidLocation { .. } => "INVALID_LOCATION",
                    PlannerError::InvalidDate { .. } => "INVALID_DATE",
                    PlannerError::Configuration { .. } => "CONFIGURATION_ERROR",
                    PlannerError::Internal { .. } => "INTERNAL_ERROR",
                };
                let status = if e.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, ApiError::new(code, e.to_string().trim_end()))
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        AppError::Planner(err)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Planner(PlannerError::internal_with_context(
            format!("planning task failed: {}", err),
            ErrorContext::new("spawn_blocking"),
        ))
    }
}
