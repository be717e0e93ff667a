//! HTTP handlers, grouped by resource.
//!
//! Every failure leaves a handler as an [`ApiError`], rendered as
//! `{"detail": "..."}` with the status mapped from [`KairosError`].

pub mod auth;
pub mod doc;
pub mod health;
pub mod tasks;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use kairos_core::KairosError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Error leaving a handler. 401 responses carry `WWW-Authenticate: Bearer`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }
}

impl From<KairosError> for ApiError {
    fn from(e: KairosError) -> Self {
        let status = match &e {
            KairosError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            KairosError::NotFound { .. } => StatusCode::NOT_FOUND,
            KairosError::InvalidCredentials | KairosError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            KairosError::EmailTaken => StatusCode::BAD_REQUEST,
            KairosError::Io(_) | KairosError::Serialize(_) | KairosError::Other(_) => {
                error!("Request failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse { detail: self.detail });
        if self.status == StatusCode::UNAUTHORIZED {
            (self.status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (self.status, body).into_response()
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
