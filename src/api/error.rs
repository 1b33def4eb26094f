//! Mapping of gateway errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::workflows::WorkflowError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Workflow(WorkflowError::Validation(message.into()))
    }

    /// Status and JSON body for this error.
    pub fn status_and_body(&self) -> (StatusCode, Value) {
        match self {
            ApiError::Workflow(err) => match err {
                WorkflowError::Validation(message) => {
                    (StatusCode::BAD_REQUEST, json!({ "message": message }))
                }
                WorkflowError::Authorization(denial) => (
                    StatusCode::BAD_REQUEST,
                    json!({ "detail": denial.to_string() }),
                ),
                WorkflowError::Authentication(message) => {
                    (StatusCode::UNAUTHORIZED, json!({ "detail": message }))
                }
                WorkflowError::Identity(err) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": err.payload() }),
                ),
                WorkflowError::Audit(err) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": err.to_string() }),
                ),
            },
            ApiError::Auth(err) => match err {
                AuthError::Unauthenticated | AuthError::InvalidToken(_) => (
                    StatusCode::UNAUTHORIZED,
                    json!({ "detail": err.to_string() }),
                ),
                AuthError::Upstream(upstream) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": upstream.payload() }),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}
