//! Error types for the User API service.
//!
//! The single adaptation layer translating the auth/directory taxonomy
//! into HTTP statuses: decode failures and bad credentials map to 401,
//! structure/purpose/role failures to 403, duplicates to 409, the
//! last-admin guard to 406. Directory outages stay 500 - a database
//! failure is not an invalid token.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gatehouse_auth_core::AuthError;
use gatehouse_db::DbError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("User not found")]
    NotFound,

    #[error("The following fields must be unique: {0}")]
    Conflict(String),

    #[error("Trying to delete the last admin user, impossible")]
    LastAdmin,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error")]
    Db(DbError),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(constraint) => Self::Conflict(constraint),
            DbError::NotFound => Self::NotFound,
            err => Self::Db(err),
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::LastAdmin => StatusCode::NOT_ACCEPTABLE,
            Self::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::LastAdmin => "LAST_ADMIN",
            Self::Auth(e) => e.error_code(),
            Self::Db(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Internal errors get logged in full; auth failures at debug so
        // expired vs. invalid vs. wrong-purpose stay visible in logs
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Internal API error");
        } else {
            tracing::debug!(error = ?self, code, "Request rejected");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
