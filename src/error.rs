//! HTTP-facing errors. Clients only ever see the safe message; the underlying
//! cause is logged here.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::db::RepoError;
use crate::extractors::rejection_message;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InvalidBody(rejection) => {
                warn!(error = %rejection.body_text(), "rejected request body");
                (rejection.status(), rejection_message(rejection).into())
            }
            ApiError::Repo(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Repo(e) if e.violates_foreign_key() => {
                warn!(error = %e, "referenced user does not exist");
                (StatusCode::BAD_REQUEST, "User does not exist".into())
            }
            ApiError::Repo(e @ RepoError::Connection(_)) => {
                error!(error = %e, "database unreachable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable. Please try again later.".into(),
                )
            }
            ApiError::Repo(e @ RepoError::Timeout(_)) => {
                error!(error = %e, "database call timed out");
                (StatusCode::GATEWAY_TIMEOUT, GENERIC_FAILURE.into())
            }
            ApiError::Repo(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.into())
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(json!({
            "success": false,
            "error": message,
        }));
        (status, body).into_response()
    }
}
