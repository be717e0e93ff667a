//! Account registration and login.
//!
//! Both handlers run argon2 on the blocking pool.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use kairos_auth::AccessToken;
use kairos_core::{KairosError, UserPublic};

use crate::state::AppState;

use super::{ApiResult, ErrorResponse};

/// Body of both `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

async fn blocking<T, F>(f: F) -> Result<T, KairosError>
where
    F: FnOnce() -> Result<T, KairosError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| KairosError::Other(format!("credential worker failed: {}", e)))?
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created", body = UserPublic),
        (status = 400, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Malformed email or short password", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserPublic>)> {
    let Json(body) = payload?;
    let auth = state.auth.clone();
    let user = blocking(move || auth.register(&body.email, &body.password)).await?;
    Ok((StatusCode::CREATED, Json(UserPublic::from(&user))))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = Credentials,
    responses(
        (status = 200, description = "Access token", body = AccessToken),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<AccessToken>> {
    let Json(body) = payload?;
    let auth = state.auth.clone();
    let token = blocking(move || auth.login(&body.email, &body.password)).await?;
    Ok(Json(token))
}
